use log::debug;

use crate::config::GoalSteps;
use crate::data::{Pos, DIRECTIONS};
use crate::level::Level;
use crate::solver::sat::atoms::{Atom, AtomTable};

/// Disjunction of literals, positive for the variable and negative for its negation
pub(crate) type Clause = Vec<i32>;

/// Clauses of the planning problem together with the atoms they use.
#[derive(Debug)]
pub(crate) struct Formula {
    pub(crate) atoms: AtomTable,
    pub(crate) clauses: Vec<Clause>,
}

/// Builds the planning formula for `horizon` steps.
///
/// The groups are added in a fixed order so variable numbering is deterministic.
pub(crate) fn encode(level: &Level, horizon: u32, goal_steps: GoalSteps) -> Formula {
    let mut encoder = Encoder {
        level,
        horizon,
        cells: level.playable(),
        atoms: AtomTable::new(),
        clauses: Vec::new(),
    };
    encoder.initial_state();
    encoder.goal(goal_steps);
    encoder.action_schemas();
    encoder.frame_axioms();
    debug!(
        "Encoded horizon {}: {} variables, {} clauses",
        horizon,
        encoder.atoms.len(),
        encoder.clauses.len()
    );
    Formula {
        atoms: encoder.atoms,
        clauses: encoder.clauses,
    }
}

struct Encoder<'a> {
    level: &'a Level,
    horizon: u32,
    cells: Vec<Pos>,
    atoms: AtomTable,
    clauses: Vec<Clause>,
}

impl Encoder<'_> {
    fn worker_at(&mut self, pos: Pos, t: u32) -> i32 {
        self.atoms.var(Atom::WorkerAt(pos, t))
    }

    fn box_at(&mut self, pos: Pos, t: u32) -> i32 {
        self.atoms.var(Atom::BoxAt(pos, t))
    }

    fn move_var(&mut self, from: Pos, to: Pos, t: u32) -> i32 {
        self.atoms.var(Atom::Move(from, to, t))
    }

    fn push_var(&mut self, from: Pos, to: Pos, t: u32) -> i32 {
        self.atoms.var(Atom::Push(from, to, t))
    }

    /// Every playable cell fixed at t = 0
    fn initial_state(&mut self) {
        let state = self.level.state.clone();
        for pos in self.cells.clone() {
            let worker = self.worker_at(pos, 0);
            let worker_lit = if state.player_pos == pos { worker } else { -worker };
            let box_var = self.box_at(pos, 0);
            let box_lit = if state.has_box(pos) { box_var } else { -box_var };
            self.clauses.push(vec![worker_lit]);
            self.clauses.push(vec![box_lit]);
        }
    }

    /// One goal variable per accepted timestep, each implying a box on every dock
    fn goal(&mut self, goal_steps: GoalSteps) {
        let steps: Vec<u32> = match goal_steps {
            GoalSteps::Final => vec![self.horizon],
            GoalSteps::Any => (0..=self.horizon).collect(),
        };
        let mut any_goal = Vec::new();
        for t in steps {
            let goal = self.atoms.var(Atom::Goal(t));
            any_goal.push(goal);
            for &dock in self.level.docks() {
                let box_var = self.box_at(dock, t);
                self.clauses.push(vec![-goal, box_var]);
            }
        }
        self.clauses.push(any_goal);
    }

    /// Preconditions and effects as implications from each action
    fn action_schemas(&mut self) {
        for t in 0..self.horizon {
            for from in self.cells.clone() {
                for &dir in &DIRECTIONS {
                    let to = from + dir;
                    if !self.level.is_free(to) {
                        continue;
                    }

                    let mov = self.move_var(from, to, t);
                    let pre_worker = self.worker_at(from, t);
                    let pre_no_box = -self.box_at(to, t);
                    let add_worker = self.worker_at(to, t + 1);
                    let del_worker = -self.worker_at(from, t + 1);
                    for &lit in &[pre_worker, pre_no_box, add_worker, del_worker] {
                        self.clauses.push(vec![-mov, lit]);
                    }

                    let push = self.push_var(from, to, t);
                    let box_dest = to + dir;
                    if !self.level.is_free(box_dest) {
                        self.clauses.push(vec![-push]);
                        continue;
                    }
                    let pre_worker = self.worker_at(from, t);
                    let pre_box = self.box_at(to, t);
                    let pre_dest_empty = -self.box_at(box_dest, t);
                    let add_worker = self.worker_at(to, t + 1);
                    let add_box = self.box_at(box_dest, t + 1);
                    let del_worker = -self.worker_at(from, t + 1);
                    let del_box = -self.box_at(to, t + 1);
                    for &lit in &[
                        pre_worker,
                        pre_box,
                        pre_dest_empty,
                        add_worker,
                        add_box,
                        del_worker,
                        del_box,
                    ] {
                        self.clauses.push(vec![-push, lit]);
                    }
                }
            }
        }
    }

    /// Every change of a fluent is explained by exactly one action
    fn frame_axioms(&mut self) {
        for t in 0..self.horizon {
            for cell in self.cells.clone() {
                let mut worker_in = Vec::new();
                let mut worker_out = Vec::new();
                let mut box_in = Vec::new();
                let mut box_out = Vec::new();

                for &dir in &DIRECTIONS {
                    let next = cell + dir;
                    if !self.level.is_free(next) {
                        continue;
                    }
                    worker_in.push(self.move_var(next, cell, t));
                    worker_in.push(self.push_var(next, cell, t));
                    worker_out.push(self.move_var(cell, next, t));
                    worker_out.push(self.push_var(cell, next, t));

                    // box comes from `next`, pushed by the worker standing behind it
                    let pusher = next + dir;
                    if self.level.is_free(pusher) {
                        box_in.push(self.push_var(pusher, next, t));
                    }
                    // box leaves toward `next`, pushed from the opposite side
                    let pusher = cell + dir.inverse();
                    if self.level.is_free(pusher) {
                        box_out.push(self.push_var(pusher, cell, t));
                    }
                }

                let worker_now = self.worker_at(cell, t);
                let worker_next = self.worker_at(cell, t + 1);
                self.exactly_one(&[worker_now, -worker_next], &worker_in);
                self.exactly_one(&[-worker_now, worker_next], &worker_out);

                let box_now = self.box_at(cell, t);
                let box_next = self.box_at(cell, t + 1);
                self.exactly_one(&[box_now, -box_next], &box_in);
                self.exactly_one(&[-box_now, box_next], &box_out);
            }
        }
    }

    /// Unless one of `guard` holds, exactly one of `options` is true
    fn exactly_one(&mut self, guard: &[i32], options: &[i32]) {
        let mut at_least_one = guard.to_vec();
        at_least_one.extend_from_slice(options);
        self.clauses.push(at_least_one);

        for (i, &a) in options.iter().enumerate() {
            for &b in &options[i + 1..] {
                let mut at_most_one = guard.to_vec();
                at_most_one.push(-a);
                at_most_one.push(-b);
                self.clauses.push(at_most_one);
            }
        }
    }
}
