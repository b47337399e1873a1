use std::fmt::{self, Display, Formatter};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Custom,
    Xsb,
}

/// Which backend solves the level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Best-first search over states
    Search,
    /// Bounded planning formula handed to a SAT solver
    Sat,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Method::Search => write!(f, "search"),
            Method::Sat => write!(f, "sat"),
        }
    }
}

/// Bounds on the search backend - it has no horizon of its own
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of created states
    pub max_states: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl SearchLimits {
    pub const DEFAULT_MAX_STATES: usize = 5_000_000;

    pub fn unlimited() -> Self {
        SearchLimits {
            max_states: None,
            time_limit: None,
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_states: Some(Self::DEFAULT_MAX_STATES),
            time_limit: None,
        }
    }
}

/// How the search orders states waiting to be expanded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scoring {
    /// Depth plus the cheapest matching of boxes to docks
    Assignment,
    /// Depth only, a breadth-first search giving the fewest moves
    Depth,
}

impl Default for Scoring {
    fn default() -> Self {
        Scoring::Assignment
    }
}

/// Timesteps at which the SAT backend accepts the goal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalSteps {
    /// Only at the horizon
    Final,
    /// At any timestep up to the horizon, the plan is cut at the first one
    Any,
}

/// How a satisfying assignment is turned back into moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoding {
    /// True move/push atoms ordered by timestep
    Actions,
    /// Differences between consecutive worker positions
    WorkerPositions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SatOptions {
    pub goal_steps: GoalSteps,
    pub decoding: Decoding,
    pub time_limit: Option<Duration>,
}

impl Default for SatOptions {
    fn default() -> Self {
        SatOptions {
            goal_steps: GoalSteps::Final,
            decoding: Decoding::Actions,
            time_limit: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub method: Method,
    /// Number of timesteps the SAT backend plans for, ignored by search
    pub horizon: u32,
    pub search: SearchLimits,
    pub scoring: Scoring,
    pub sat: SatOptions,
}

impl SolverConfig {
    pub fn new(method: Method, horizon: u32) -> Self {
        SolverConfig {
            method,
            horizon,
            search: SearchLimits::default(),
            scoring: Scoring::default(),
            sat: SatOptions::default(),
        }
    }
}
