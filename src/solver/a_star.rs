use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::{self, Debug, Display, Formatter};
use std::time::Instant;

use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info, trace};
use prettytable::{format, Cell, Row, Table};
use separator::Separatable;
use typed_arena::Arena;

use crate::config::{Scoring, SearchLimits};
use crate::level::Level;
use crate::solver::assignment::min_cost_assignment;
use crate::solver::SolverErr;
use crate::state::State;

#[derive(Clone, PartialEq, Eq)]
pub struct Stats {
    created_states: Vec<usize>,
    visited_states: Vec<usize>,
    duplicate_states: Vec<usize>,
    frontier_left: usize,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Stats {
            created_states: vec![],
            visited_states: vec![],
            duplicate_states: vec![],
            frontier_left: 0,
        }
    }

    pub fn total_created(&self) -> usize {
        self.created_states.iter().sum::<usize>()
    }

    pub fn total_unique_visited(&self) -> usize {
        self.visited_states.iter().sum::<usize>()
    }

    pub fn total_reached_duplicates(&self) -> usize {
        self.duplicate_states.iter().sum::<usize>()
    }

    /// Expanded states plus states still waiting in the frontier when the search ended
    pub fn total_explored(&self) -> usize {
        self.total_unique_visited() + self.frontier_left
    }

    pub(crate) fn add_created(&mut self, dist: u32) -> bool {
        Self::add(&mut self.created_states, dist)
    }

    pub(crate) fn add_unique_visited(&mut self, dist: u32) -> bool {
        Self::add(&mut self.visited_states, dist)
    }

    pub(crate) fn add_reached_duplicate(&mut self, dist: u32) -> bool {
        Self::add(&mut self.duplicate_states, dist)
    }

    fn add(counts: &mut Vec<usize>, dist: u32) -> bool {
        let mut ret = false;

        // while because some depths might be skipped
        while dist as usize >= counts.len() {
            counts.push(0);
            ret = true;
        }
        counts[dist as usize] += 1;
        ret
    }

    fn depth_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.set_titles(Row::new(vec![
            Cell::new("Depth"),
            Cell::new("Created"),
            Cell::new("Unique"),
            Cell::new("Duplicates"),
            Cell::new("Unknown (not reached)"),
        ]));
        // created_states should be the longest vec
        for (i, &created) in self.created_states.iter().enumerate() {
            let visited = self.visited_states.get(i).cloned().unwrap_or(0);
            let duplicates = self.duplicate_states.get(i).cloned().unwrap_or(0);
            let left = created.saturating_sub(visited + duplicates);
            table.add_row(Row::new(vec![
                Cell::new(&format!("{}:", i)),
                Cell::new(&created.separated_string()),
                Cell::new(&visited.separated_string()),
                Cell::new(&duplicates.separated_string()),
                Cell::new(&left.separated_string()),
            ]));
        }
        table
    }
}

impl Debug for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "created by depth: {:?}", self.created_states)?;
        writeln!(f, "reached duplicates by depth: {:?}", self.duplicate_states)?;
        writeln!(f, "unique visited by depth: {:?}", self.visited_states)?;
        writeln!(f, "total created: {}", self.total_created().separated_string())?;
        writeln!(
            f,
            "total reached duplicates: {}",
            self.total_reached_duplicates().separated_string()
        )?;
        writeln!(
            f,
            "total unique visited: {}",
            self.total_unique_visited().separated_string()
        )
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let created = self.total_created();
        let duplicates = self.total_reached_duplicates();
        let visited = self.total_unique_visited();
        let left = created.saturating_sub(visited + duplicates);
        writeln!(f, "States created total: {}", created.separated_string())?;
        writeln!(f, "Unique visited total: {}", visited.separated_string())?;
        writeln!(f, "Reached duplicates total: {}", duplicates.separated_string())?;
        writeln!(f, "Created but not reached total: {}", left.separated_string())?;
        writeln!(
            f,
            "States searched (visited + frontier): {}",
            self.total_explored().separated_string()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.depth_table())
    }
}

/// Node of the search tree - `prev` indexes into the node arena of the current search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchNode<'a> {
    pub(crate) state: &'a State,
    pub(crate) prev: Option<usize>,
    pub(crate) dist: u32,
    pub(crate) cost: u32,
}

/// Frontier entry, ordered by cost and then by creation so ties are resolved FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Queued {
    cost: u32,
    index: usize,
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // intentionally reversed for BinaryHeap
        (other.cost, other.index).cmp(&(self.cost, self.index))
    }
}

/// Best-first search from the level's initial state.
///
/// Returns all states from the initial one to the solved one,
/// each differing from the previous by one move.
pub(crate) fn search(
    level: &Level,
    limits: &SearchLimits,
    scoring: Scoring,
) -> Result<(Vec<State>, Stats), SolverErr> {
    debug!("Search called");

    let started = Instant::now();
    let mut stats = Stats::new();

    if level.is_solved(&level.state) {
        stats.add_created(0);
        return Ok((vec![level.state.clone()], stats));
    }

    let arena = Arena::new();
    let mut nodes: Vec<SearchNode<'_>> = Vec::new();
    let mut to_visit = BinaryHeap::new();
    // state -> index of its best node still waiting in to_visit
    let mut frontier: FnvHashMap<&State, usize> = FnvHashMap::default();
    let mut closed: FnvHashSet<&State> = FnvHashSet::default();

    let start: &State = arena.alloc(level.state.clone());
    nodes.push(SearchNode {
        state: start,
        prev: None,
        dist: 0,
        cost: 0,
    });
    frontier.insert(start, 0);
    to_visit.push(Queued { cost: 0, index: 0 });
    stats.add_created(0);

    while let Some(Queued { index, .. }) = to_visit.pop() {
        let cur_node = nodes[index];
        if frontier.get(cur_node.state) != Some(&index) {
            // a cheaper node for the same state was queued later, or it's been expanded already
            stats.add_reached_duplicate(cur_node.dist);
            continue;
        }
        frontier.remove(cur_node.state);
        closed.insert(cur_node.state);
        if stats.add_unique_visited(cur_node.dist) {
            debug!("Visited new depth: {}", cur_node.dist);
            trace!("{:?}", stats);
        }

        if let Some(limit) = limits.time_limit {
            if started.elapsed() > limit {
                info!("Time limit reached after {:?}", started.elapsed());
                return Err(SolverErr::ResourceExhausted);
            }
        }

        for neighbor_state in expand(level, cur_node.state) {
            if closed.contains(&neighbor_state) || level.has_dead_box(&neighbor_state) {
                continue;
            }

            let dist = cur_node.dist + 1;
            if level.is_solved(&neighbor_state) {
                stats.add_created(dist);
                stats.frontier_left = frontier.len();
                info!(
                    "Solved, states searched: {}",
                    stats.total_explored().separated_string()
                );
                let mut path = backtrack_path(&nodes, index);
                path.push(neighbor_state);
                return Ok((path, stats));
            }

            let cost = match scoring {
                Scoring::Assignment => dist + heuristic(level, &neighbor_state),
                Scoring::Depth => dist,
            };
            if let Some(&queued) = frontier.get(&neighbor_state) {
                if nodes[queued].cost <= cost {
                    continue;
                }
            }

            if let Some(max) = limits.max_states {
                if stats.total_created() >= max {
                    info!("State limit {} reached", max.separated_string());
                    return Err(SolverErr::ResourceExhausted);
                }
            }

            let state: &State = arena.alloc(neighbor_state);
            let next_index = nodes.len();
            nodes.push(SearchNode {
                state,
                prev: Some(index),
                dist,
                cost,
            });
            frontier.insert(state, next_index);
            to_visit.push(Queued {
                cost,
                index: next_index,
            });
            stats.add_created(dist);
        }
    }

    info!(
        "Frontier exhausted, states searched: {}",
        stats.total_explored().separated_string()
    );
    Err(SolverErr::NoSolution)
}

/// Walks and single pushes available to the worker
fn expand(level: &Level, state: &State) -> Vec<State> {
    let mut new_states = Vec::new();

    for new_player_pos in level.adjacent_free(state.player_pos) {
        if !state.has_box(new_player_pos) {
            // step
            new_states.push(state.with_player(new_player_pos));
        } else if let Some((pushed_player_pos, push_dest)) =
            level.attempt_push(state.player_pos, new_player_pos, state)
        {
            new_states.push(state.with_push(pushed_player_pos, new_player_pos, push_dest));
        }
    }

    new_states
}

/// Lower bound on remaining pushes - cheapest matching of boxes to goals by manhattan distance
fn heuristic(level: &Level, state: &State) -> u32 {
    let costs: Vec<Vec<i64>> = state
        .boxes
        .iter()
        .map(|&b| level.goals.iter().map(|&g| i64::from(b.dist(g))).collect())
        .collect();
    let (total, _) = min_cost_assignment(&costs);
    total as u32
}

fn backtrack_path(nodes: &[SearchNode<'_>], last: usize) -> Vec<State> {
    let mut ret = Vec::new();
    let mut index = Some(last);
    while let Some(i) = index {
        ret.push(nodes[i].state.clone());
        index = nodes[i].prev;
    }
    ret.reverse();
    ret
}
