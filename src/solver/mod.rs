pub(crate) mod a_star;
mod assignment;
mod backtracking;
pub mod sat;

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use log::debug;

use crate::config::{Method, SatOptions, Scoring, SearchLimits, SolverConfig};
use crate::data::{Dir, Pos};
use crate::level::Level;
use crate::moves::Moves;
use crate::Solve;

pub use self::a_star::Stats;
pub use self::sat::{FormulaStats, SatPlanner, SatSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverErr {
    /// Search exhausted all states or the formula is unsatisfiable within the horizon
    NoSolution,
    /// A state count or time limit was hit before the solver finished
    ResourceExhausted,
    /// Two consecutive search states can't be connected by walking - a solver bug
    UnreachableWalk { from: Pos, to: Pos },
    /// The SAT solver returned a model that doesn't decode into a plan
    Sat(String),
}

impl Display for SolverErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SolverErr::NoSolution => write!(f, "No solution"),
            SolverErr::ResourceExhausted => write!(f, "Ran out of states or time"),
            SolverErr::UnreachableWalk { from, to } => {
                write!(f, "Can't walk from {} to {} between states", from, to)
            }
            SolverErr::Sat(ref msg) => write!(f, "Invalid SAT model: {}", msg),
        }
    }
}

impl Error for SolverErr {}

#[derive(Clone, PartialEq, Eq)]
pub enum PlanStats {
    Search(Stats),
    Sat(FormulaStats),
}

impl Display for PlanStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            PlanStats::Search(ref stats) => write!(f, "{}", stats),
            PlanStats::Sat(ref stats) => write!(f, "{}", stats),
        }
    }
}

impl Debug for PlanStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            PlanStats::Search(ref stats) => write!(f, "{:?}", stats),
            PlanStats::Sat(ref stats) => write!(f, "{}", stats),
        }
    }
}

/// A validated solution - replaying `moves` from the initial state puts every box on a goal.
pub struct Plan {
    pub moves: Moves,
    pub stats: PlanStats,
    pub method: Method,
}

impl Plan {
    fn new(moves: Moves, stats: PlanStats, method: Method) -> Self {
        Self {
            moves,
            stats,
            method,
        }
    }

    pub fn controls(&self) -> Vec<Dir> {
        self.moves.dirs()
    }
}

impl Debug for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.method, self.moves)?;
        write!(f, "{:?}", self.stats)
    }
}

/// One solving backend - both take the same level and horizon.
pub trait Planner {
    fn plan(&self, level: &Level, horizon: u32) -> Result<Plan, SolverErr>;
}

/// Best-first search, ignores the horizon
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPlanner {
    pub limits: SearchLimits,
    pub scoring: Scoring,
}

impl Planner for SearchPlanner {
    fn plan(&self, level: &Level, _horizon: u32) -> Result<Plan, SolverErr> {
        let (states, stats) = a_star::search(level, &self.limits, self.scoring)?;
        debug!("Found path with {} states, translating to moves", states.len());
        let moves = backtracking::moves_from_states(level, &states)?;
        Ok(Plan::new(moves, PlanStats::Search(stats), Method::Search))
    }
}

impl Solve for Level {
    fn solve(&self, config: &SolverConfig) -> Result<Plan, SolverErr> {
        planner(config).plan(self, config.horizon)
    }
}

/// Picks the backend selected in `config`
pub fn planner(config: &SolverConfig) -> Box<dyn Planner> {
    match config.method {
        Method::Search => Box::new(SearchPlanner {
            limits: config.search,
            scoring: config.scoring,
        }),
        Method::Sat => Box::new(SatPlanner {
            options: config.sat,
        }),
    }
}

/// Same as `planner` but with default limits
pub fn planner_for(method: Method) -> Box<dyn Planner> {
    match method {
        Method::Search => Box::new(SearchPlanner::default()),
        Method::Sat => Box::new(SatPlanner {
            options: SatOptions::default(),
        }),
    }
}
