//! Bounded planning formula solved by CaDiCaL.
//!
//! Fluents `worker_at`/`box_at` for every playable cell and timestep `0..=T`,
//! `move`/`push` actions for every ordered pair of adjacent cells and step `0..T`.
//! Actions imply their preconditions and effects, frame axioms require every change
//! of a fluent to be explained by exactly one action.

mod atoms;
mod decoder;
mod encoder;
mod solver;

use std::fmt::{self, Debug, Display, Formatter};
use std::time::{Duration, Instant};

use log::{debug, info};
use separator::Separatable;

use crate::config::{Decoding, Method, SatOptions};
use crate::level::Level;
use crate::moves::Moves;
use crate::solver::{Plan, PlanStats, Planner, SolverErr};

use self::atoms::AtomTable;
use self::solver::{Model, Outcome, SatSolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaStats {
    pub horizon: u32,
    pub variables: usize,
    pub clauses: usize,
    pub solve_time: Duration,
}

impl Display for FormulaStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Horizon: {}", self.horizon)?;
        writeln!(f, "Variables: {}", self.variables.separated_string())?;
        writeln!(f, "Clauses: {}", self.clauses.separated_string())?;
        writeln!(f, "Solve time: {} ms", self.solve_time.as_millis())
    }
}

/// SAT backend, builds a fresh formula for every call
#[derive(Debug, Clone, Copy, Default)]
pub struct SatPlanner {
    pub options: SatOptions,
}

impl Planner for SatPlanner {
    fn plan(&self, level: &Level, horizon: u32) -> Result<Plan, SolverErr> {
        SatSession::new(level, horizon, self.options).next_plan()
    }
}

/// One formula kept alive across solves.
///
/// Every satisfiable `next_plan` blocks the model it read, even when decoding it fails,
/// so the following call returns a different one.
pub struct SatSession<'a> {
    level: &'a Level,
    horizon: u32,
    options: SatOptions,
    atoms: AtomTable,
    solver: SatSolver,
}

impl<'a> SatSession<'a> {
    pub fn new(level: &'a Level, horizon: u32, options: SatOptions) -> Self {
        let formula = encoder::encode(level, horizon, options.goal_steps);
        let mut solver = SatSolver::new(options.time_limit);
        solver.add_clauses(&formula.clauses);
        SatSession {
            level,
            horizon,
            options,
            atoms: formula.atoms,
            solver,
        }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn next_plan(&mut self) -> Result<Plan, SolverErr> {
        debug!("Solving horizon {}", self.horizon);
        let started = Instant::now();
        let outcome = self.solver.solve();
        let stats = FormulaStats {
            horizon: self.horizon,
            variables: self.atoms.len(),
            clauses: self.solver.clause_cnt(),
            solve_time: started.elapsed(),
        };

        match outcome {
            Outcome::Unsat => {
                info!("No solution within horizon {}", self.horizon);
                return Err(SolverErr::NoSolution);
            }
            Outcome::Interrupted => {
                info!("Time limit reached after {:?}", stats.solve_time);
                return Err(SolverErr::ResourceExhausted);
            }
            Outcome::Sat => {}
        }

        let model = self.take_model();
        let moves = match self.options.decoding {
            Decoding::Actions => decoder::decode_actions(&self.atoms, &model)?,
            Decoding::WorkerPositions => {
                decoder::decode_worker_positions(self.level, self.horizon, &self.atoms, &model)?
            }
        };
        let moves = shortest_solved_prefix(self.level, moves)?;
        info!("Found plan with {} moves", moves.move_cnt());
        Ok(Plan::new(moves, PlanStats::Sat(stats), Method::Sat))
    }

    /// Reads the last model and forbids it for later solves
    fn take_model(&mut self) -> Model {
        let model = self.solver.model(self.atoms.len());
        self.solver
            .add_clause(&model.blocking_clause(self.atoms.len()));
        model
    }
}

impl Debug for SatSession<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SatSession {{ horizon: {}, variables: {}, {:?} }}",
            self.horizon,
            self.atoms.len(),
            self.solver
        )
    }
}

/// Replays decoded moves and cuts them after the first solved state.
///
/// The model may keep moving after the boxes are on the docks when
/// the goal is only required at the horizon.
fn shortest_solved_prefix(level: &Level, mut moves: Moves) -> Result<Moves, SolverErr> {
    let mut state = level.state.clone();
    let mut solved_at = if level.is_solved(&state) { Some(0) } else { None };

    for (i, mov) in moves.iter().enumerate() {
        if solved_at.is_some() {
            break;
        }
        let (next, is_push) = level
            .apply(&state, mov.dir)
            .ok_or_else(|| SolverErr::Sat(format!("move {} of {} is blocked", i, moves)))?;
        if is_push != mov.is_push {
            return Err(SolverErr::Sat(format!("push flag of move {} of {}", i, moves)));
        }
        if level.is_solved(&next) {
            solved_at = Some(i + 1);
        }
        state = next;
    }

    match solved_at {
        Some(len) => {
            moves.truncate(len);
            Ok(moves)
        }
        None => Err(SolverErr::Sat(format!("{} doesn't solve the level", moves))),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GoalSteps;
    use crate::data::Dir;

    use super::*;

    const ONE_WAY: &str = r"
#######
#@ $ .#
#######
";

    const TWO_BOXES: &str = r"
#######
#     #
# $$  #
#  @  #
# ..  #
#######
";

    fn solve_model(level: &Level, horizon: u32, options: SatOptions) -> Option<(AtomTable, Model)> {
        let formula = encoder::encode(level, horizon, options.goal_steps);
        let mut solver = SatSolver::new(None);
        solver.add_clauses(&formula.clauses);
        match solver.solve() {
            Outcome::Sat => {
                let model = solver.model(formula.atoms.len());
                Some((formula.atoms, model))
            }
            _ => None,
        }
    }

    #[test]
    fn decodings_agree() {
        for &(level, horizon) in &[(ONE_WAY, 5), (TWO_BOXES, 12), (TWO_BOXES, 14)] {
            let level: Level = level.parse().unwrap();
            let (atoms, model) = solve_model(&level, horizon, SatOptions::default()).unwrap();
            let actions = decoder::decode_actions(&atoms, &model).unwrap();
            let workers =
                decoder::decode_worker_positions(&level, horizon, &atoms, &model).unwrap();
            assert_eq!(actions, workers);
            assert!(level.is_solved(&level.replay(actions.dirs()).unwrap()));
        }
    }

    #[test]
    fn decoding_options_give_same_plan() {
        let level: Level = TWO_BOXES.parse().unwrap();
        let mut options = SatOptions::default();
        let by_actions = SatPlanner { options }.plan(&level, 12).unwrap();
        options.decoding = Decoding::WorkerPositions;
        let by_workers = SatPlanner { options }.plan(&level, 12).unwrap();
        assert_eq!(by_actions.moves, by_workers.moves);
    }

    #[test]
    fn horizon_monotonicity() {
        let level: Level = ONE_WAY.parse().unwrap();
        // a walk and two pushes
        for horizon in 0..3 {
            assert_eq!(
                SatPlanner::default().plan(&level, horizon).unwrap_err(),
                SolverErr::NoSolution
            );
        }
        let shortest = SatPlanner::default().plan(&level, 3).unwrap();
        assert_eq!(shortest.moves.to_string(), "rRR");
        for horizon in 4..8 {
            let plan = SatPlanner::default().plan(&level, horizon).unwrap();
            assert!(level.is_solved(&level.replay(plan.controls()).unwrap()));
            assert_eq!(plan.moves.push_cnt(), 2);
        }
    }

    #[test]
    fn goal_at_any_step() {
        let level: Level = ONE_WAY.parse().unwrap();
        let options = SatOptions {
            goal_steps: GoalSteps::Any,
            ..SatOptions::default()
        };
        let plan = SatPlanner { options }.plan(&level, 6).unwrap();
        assert!(level.is_solved(&level.replay(plan.controls()).unwrap()));
        assert_eq!(plan.controls().last(), Some(&Dir::Right));
        match plan.stats {
            PlanStats::Sat(stats) => {
                assert_eq!(stats.horizon, 6);
                assert!(stats.variables > 0);
                assert!(stats.clauses > 0);
            }
            PlanStats::Search(_) => panic!("wrong stats"),
        }
    }

    #[test]
    fn blocking_gives_different_models() {
        let level: Level = TWO_BOXES.parse().unwrap();
        // the shortest plan has 11 moves so there is always at least one idle step to shift around
        let mut session = SatSession::new(&level, 12, SatOptions::default());
        for _ in 0..3 {
            let plan = session.next_plan().unwrap();
            let end = level.replay(plan.controls()).unwrap();
            assert!(level.is_solved(&end));
        }
        assert_eq!(session.horizon(), 12);
    }

    #[test]
    fn blocking_exhausts_models() {
        // worker boxed in next to the box - the only plan is one push
        let level: Level = r"
#####
#@$.#
#####
"
        .parse()
        .unwrap();
        let mut session = SatSession::new(&level, 1, SatOptions::default());
        assert_eq!(session.next_plan().unwrap().moves.to_string(), "R");
        assert_eq!(session.next_plan().unwrap_err(), SolverErr::NoSolution);
    }

    #[test]
    fn model_is_blocked_before_decoding() {
        let level: Level = r"
#####
#@$.#
#####
"
        .parse()
        .unwrap();
        let mut session = SatSession::new(&level, 1, SatOptions::default());
        assert_eq!(session.solver.solve(), Outcome::Sat);
        let model = session.take_model();
        // nothing decoded yet, the only model is already gone
        assert_eq!(session.solver.solve(), Outcome::Unsat);
        assert!(decoder::decode_actions(&session.atoms, &model).is_ok());
    }

    #[test]
    fn prefix_truncation() {
        let level: Level = ONE_WAY.parse().unwrap();
        let moves: Moves = "rRRl".parse().unwrap();
        assert_eq!(
            shortest_solved_prefix(&level, moves).unwrap().to_string(),
            "rRR"
        );

        let blocked: Moves = "u".parse().unwrap();
        match shortest_solved_prefix(&level, blocked) {
            Err(SolverErr::Sat(_)) => {}
            other => panic!("expected a decoding error, got {:?}", other.map(|m| m.to_string())),
        }
    }
}
