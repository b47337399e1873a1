use std::fmt::{self, Debug, Formatter};
use std::time::{Duration, Instant};

use cadical::{Callbacks, Solver};
use log::trace;

use crate::solver::sat::encoder::Clause;

/// Asks CaDiCaL to stop once a solve call runs longer than `limit`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub(crate) fn new(limit: Duration) -> Self {
        Deadline {
            started: Instant::now(),
            limit,
        }
    }
}

impl Callbacks for Deadline {
    fn started(&mut self) {
        self.started = Instant::now();
    }

    fn terminate(&mut self) -> bool {
        self.started.elapsed() > self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Sat,
    Unsat,
    /// Stopped by the deadline
    Interrupted,
}

/// Satisfying assignment, indexed by variable (index 0 unused)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Model {
    values: Vec<bool>,
}

impl Model {
    pub(crate) fn new(values: Vec<bool>) -> Self {
        Model { values }
    }

    pub(crate) fn value(&self, var: i32) -> bool {
        self.values.get(var as usize).cloned().unwrap_or(false)
    }

    /// Clause that is false under exactly this assignment of the first `vars` variables
    pub(crate) fn blocking_clause(&self, vars: usize) -> Clause {
        (1..=vars as i32)
            .map(|var| if self.value(var) { -var } else { var })
            .collect()
    }
}

/// Incremental CaDiCaL instance - clauses can be added between solves.
pub(crate) struct SatSolver {
    solver: Solver<Deadline>,
    clauses: usize,
}

impl SatSolver {
    pub(crate) fn new(time_limit: Option<Duration>) -> Self {
        let mut solver: Solver<Deadline> = Solver::new();
        if let Some(limit) = time_limit {
            solver.set_callbacks(Some(Deadline::new(limit)));
        }
        SatSolver { solver, clauses: 0 }
    }

    pub(crate) fn add_clause(&mut self, clause: &[i32]) {
        self.solver.add_clause(clause.iter().cloned());
        self.clauses += 1;
    }

    pub(crate) fn add_clauses(&mut self, clauses: &[Clause]) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    pub(crate) fn clause_cnt(&self) -> usize {
        self.clauses
    }

    pub(crate) fn solve(&mut self) -> Outcome {
        let outcome = match self.solver.solve() {
            Some(true) => Outcome::Sat,
            Some(false) => Outcome::Unsat,
            None => Outcome::Interrupted,
        };
        trace!("CaDiCaL returned {:?}", outcome);
        outcome
    }

    /// Values of variables `1..=vars` after a satisfiable solve, unassigned ones read as false
    pub(crate) fn model(&self, vars: usize) -> Model {
        let mut values = vec![false; vars + 1];
        for var in 1..=vars {
            values[var] = self.solver.value(var as i32) == Some(true);
        }
        Model::new(values)
    }
}

impl Debug for SatSolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SatSolver {{ clauses: {} }}", self.clauses)
    }
}
