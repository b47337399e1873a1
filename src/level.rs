use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use crate::config::Format;
use crate::data::{CellKind, Dir, MapCell, Pos};
use crate::map_formatter::MapFormatter;
use crate::moves::Moves;
use crate::solution_formatter::SolutionFormatter;
use crate::state::State;
use crate::vec2d::Vec2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayErr {
    /// The move with this index walks into a wall or pushes a box that can't move
    Blocked(usize),
}

impl Display for ReplayErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ReplayErr::Blocked(step) => write!(f, "Move {} is blocked", step),
        }
    }
}

impl Error for ReplayErr {}

/// Static layout of a level plus its initial state.
///
/// Immutable once parsed - both solvers only ever read from it.
#[derive(Clone)]
pub struct Level {
    pub(crate) grid: Vec2d<MapCell>,
    /// Sorted so it can be compared with `State::boxes` directly
    pub(crate) goals: Vec<Pos>,
    pub state: State,
}

impl Level {
    pub(crate) fn new(grid: Vec2d<MapCell>, mut goals: Vec<Pos>, state: State) -> Self {
        goals.sort();
        Level { grid, goals, state }
    }

    pub fn rows(&self) -> i32 {
        self.grid.rows()
    }

    pub fn cols(&self) -> i32 {
        self.grid.cols()
    }

    pub fn walls(&self) -> Vec<Pos> {
        self.grid
            .positions()
            .filter(|&pos| self.grid[pos] == MapCell::Wall)
            .collect()
    }

    /// All cells inside the grid that are not walls
    pub fn playable(&self) -> Vec<Pos> {
        self.grid
            .positions()
            .filter(|&pos| self.grid[pos] != MapCell::Wall)
            .collect()
    }

    pub fn docks(&self) -> &[Pos] {
        &self.goals
    }

    pub fn initial_boxes(&self) -> &[Pos] {
        &self.state.boxes
    }

    pub fn initial_worker(&self) -> Pos {
        self.state.player_pos
    }

    /// Inside the grid and not a wall
    pub fn is_free(&self, pos: Pos) -> bool {
        match self.grid.get(pos) {
            Some(&cell) => cell != MapCell::Wall,
            None => false,
        }
    }

    pub fn is_dock(&self, pos: Pos) -> bool {
        self.grid.get(pos) == Some(&MapCell::Goal)
    }

    /// Neighbors of `pos` that are not walls, ignores boxes and the worker.
    pub fn adjacent_free(&self, pos: Pos) -> Vec<Pos> {
        pos.neighbors()
            .iter()
            .cloned()
            .filter(|&n| self.is_free(n))
            .collect()
    }

    /// Pushes the box at `box_pos` away from `worker`.
    ///
    /// Returns the new worker and box positions or `None` if the cell behind the box
    /// is a wall, outside the grid or occupied by another box.
    pub fn attempt_push(&self, worker: Pos, box_pos: Pos, state: &State) -> Option<(Pos, Pos)> {
        let dir = worker.dir_to(box_pos);
        debug_assert!(dir.is_some(), "Worker must be next to the pushed box");
        let push_dest = box_pos + dir?;
        if self.is_free(push_dest) && !state.has_box(push_dest) {
            Some((box_pos, push_dest))
        } else {
            None
        }
    }

    /// A box on a non-goal cell blocked both vertically and horizontally can never move again.
    ///
    /// Only detects corners - `false` doesn't mean the box can still reach a goal.
    pub fn is_dead_position(&self, pos: Pos) -> bool {
        if self.is_dock(pos) {
            return false;
        }
        let blocked = |dir: Dir| !self.is_free(pos + dir);
        (blocked(Dir::Up) || blocked(Dir::Down)) && (blocked(Dir::Left) || blocked(Dir::Right))
    }

    pub fn has_dead_box(&self, state: &State) -> bool {
        state.boxes.iter().any(|&b| self.is_dead_position(b))
    }

    pub fn is_solved(&self, state: &State) -> bool {
        state.boxes == self.goals
    }

    /// One step of the worker, pushing a box if there's one in the way.
    ///
    /// Returns the new state and whether it was a push.
    pub fn apply(&self, state: &State, dir: Dir) -> Option<(State, bool)> {
        let new_player_pos = state.player_pos + dir;
        if !self.is_free(new_player_pos) {
            return None;
        }
        if state.has_box(new_player_pos) {
            let (new_player_pos, new_box_pos) =
                self.attempt_push(state.player_pos, new_player_pos, state)?;
            Some((
                state.with_push(new_player_pos, new_player_pos, new_box_pos),
                true,
            ))
        } else {
            Some((state.with_player(new_player_pos), false))
        }
    }

    /// Plays `dirs` from the initial state and returns the final state.
    pub fn replay<I: IntoIterator<Item = Dir>>(&self, dirs: I) -> Result<State, ReplayErr> {
        let mut state = self.state.clone();
        for (i, dir) in dirs.into_iter().enumerate() {
            state = self.apply(&state, dir).ok_or(ReplayErr::Blocked(i))?.0;
        }
        Ok(state)
    }

    pub fn cell_kind(&self, state: &State, pos: Pos) -> CellKind {
        let dock = match self.grid.get(pos) {
            None | Some(MapCell::Wall) => return CellKind::Wall,
            Some(&cell) => cell == MapCell::Goal,
        };
        match (dock, state.has_box(pos), state.player_pos == pos) {
            (false, true, _) => CellKind::Box,
            (true, true, _) => CellKind::BoxOnDock,
            (false, false, true) => CellKind::Worker,
            (true, false, true) => CellKind::WorkerOnDock,
            (false, false, false) => CellKind::Floor,
            (true, false, false) => CellKind::Dock,
        }
    }

    pub fn xsb(&self) -> MapFormatter<'_> {
        self.format(Format::Xsb)
    }

    pub fn custom(&self) -> MapFormatter<'_> {
        self.format(Format::Custom)
    }

    pub fn format(&self, format: Format) -> MapFormatter<'_> {
        self.format_with_state(format, &self.state)
    }

    pub fn format_with_state<'a>(&'a self, format: Format, state: &'a State) -> MapFormatter<'a> {
        MapFormatter::new(self, state, format)
    }

    pub fn xsb_solution<'a>(&'a self, moves: &'a Moves, include_steps: bool) -> SolutionFormatter<'a> {
        SolutionFormatter::new(self, moves, include_steps, Format::Xsb)
    }

    pub fn solution<'a>(
        &'a self,
        moves: &'a Moves,
        include_steps: bool,
        format: Format,
    ) -> SolutionFormatter<'a> {
        SolutionFormatter::new(self, moves, include_steps, format)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xsb())
    }
}

impl Debug for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.xsb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_level() {
        let xsb: &str = r"
*###*
#@$.#
*###*
"
        .trim_start_matches('\n');
        let custom: &str = r"
B_<><><>B_
<>P B  _<>
B_<><><>B_
"
        .trim_start_matches('\n');

        for level in [xsb, custom].iter() {
            let level: Level = level.parse().unwrap();
            assert_eq!(level.to_string(), xsb);
            assert_eq!(level.xsb().to_string(), xsb);
            assert_eq!(level.format(Format::Xsb).to_string(), xsb);
            assert_eq!(format!("{:?}", level), xsb);

            assert_eq!(level.custom().to_string(), custom);
            assert_eq!(level.format(Format::Custom).to_string(), custom);
        }
    }

    #[test]
    fn derived_sets() {
        let level: Level = r"
#####
#@$.#
#####
"
        .parse()
        .unwrap();
        assert_eq!(level.walls().len(), 12);
        assert_eq!(
            level.playable(),
            vec![Pos::new(1, 1), Pos::new(1, 2), Pos::new(1, 3)]
        );
        assert_eq!(level.docks(), &[Pos::new(1, 3)]);
        assert_eq!(level.initial_boxes(), &[Pos::new(1, 2)]);
        assert_eq!(level.initial_worker(), Pos::new(1, 1));
    }

    #[test]
    fn adjacency_ignores_boxes() {
        let level: Level = r"
#####
#.$ #
#$@.#
#####
"
        .parse()
        .unwrap();
        let free = level.adjacent_free(Pos::new(2, 2));
        assert_eq!(free, vec![Pos::new(1, 2), Pos::new(2, 3), Pos::new(2, 1)]);
        assert_eq!(level.adjacent_free(Pos::new(1, 1)).len(), 2);
    }

    #[test]
    fn adjacency_without_border() {
        let level: Level = "@$.".parse().unwrap();
        assert_eq!(level.adjacent_free(Pos::new(0, 0)), vec![Pos::new(0, 1)]);
    }

    #[test]
    fn pushing() {
        let level: Level = r"
######
#@$$.#
# $  #
# .. #
######
"
        .parse()
        .unwrap();
        let state = &level.state;
        // box behind the box
        assert_eq!(level.attempt_push(Pos::new(1, 1), Pos::new(1, 2), state), None);
        // wall behind the box
        assert_eq!(level.attempt_push(Pos::new(2, 3), Pos::new(1, 3), state), None);
        assert_eq!(
            level.attempt_push(Pos::new(1, 2), Pos::new(2, 2), state),
            Some((Pos::new(2, 2), Pos::new(3, 2)))
        );
        assert_eq!(
            level.attempt_push(Pos::new(1, 2), Pos::new(1, 3), state),
            Some((Pos::new(1, 3), Pos::new(1, 4)))
        );
    }

    #[test]
    fn pushing_off_grid() {
        let level: Level = ".@$".parse().unwrap();
        assert_eq!(
            level.attempt_push(Pos::new(0, 1), Pos::new(0, 2), &level.state),
            None
        );
    }

    #[test]
    fn dead_corners() {
        let level: Level = DEAD_CORNERS.parse().unwrap();
        // wall corner in each of the 4 orientations
        assert!(level.is_dead_position(Pos::new(1, 1)));
        assert!(level.is_dead_position(Pos::new(1, 3)));
        assert!(level.is_dead_position(Pos::new(4, 1)));
        assert!(level.is_dead_position(Pos::new(4, 4)));
        // docks are never dead
        assert!(!level.is_dead_position(Pos::new(1, 5)));
        // next to a single wall is fine
        assert!(!level.is_dead_position(Pos::new(1, 2)));
        assert!(!level.is_dead_position(Pos::new(3, 2)));
        assert!(!level.is_dead_position(Pos::new(2, 3)));
    }

    #[test]
    fn dead_positions_are_symmetric() {
        let original: Vec<Vec<char>> = DEAD_CORNERS
            .trim_matches('\n')
            .lines()
            .map(|line| line.chars().collect())
            .collect();
        let level: Level = DEAD_CORNERS.parse().unwrap();
        let original_dead = dead_map(&level);

        for &mirror in &[false, true] {
            let (mut grid, mut dead) = if mirror {
                (mirrored(&original), mirrored(&original_dead))
            } else {
                (original.clone(), original_dead.clone())
            };
            for rotation in 0..4 {
                let text: Vec<String> = grid.iter().map(|row| row.iter().collect()).collect();
                let level: Level = text.join("\n").parse().unwrap();
                assert_eq!(dead_map(&level), dead, "mirror: {}, rotation: {}", mirror, rotation);
                grid = rotated(&grid);
                dead = rotated(&dead);
            }
        }
    }

    const DEAD_CORNERS: &str = r"
#######
#   #.#
#@$   #
## .  #
#  $ ##
#######
";

    fn dead_map(level: &Level) -> Vec<Vec<bool>> {
        (0..level.rows())
            .map(|r| {
                (0..level.cols())
                    .map(|c| level.is_dead_position(Pos::new(r, c)))
                    .collect()
            })
            .collect()
    }

    /// Quarter turn clockwise
    fn rotated<T: Copy>(grid: &[Vec<T>]) -> Vec<Vec<T>> {
        (0..grid[0].len())
            .map(|c| grid.iter().rev().map(|row| row[c]).collect())
            .collect()
    }

    fn mirrored<T: Copy>(grid: &[Vec<T>]) -> Vec<Vec<T>> {
        grid.iter()
            .map(|row| row.iter().rev().cloned().collect())
            .collect()
    }

    #[test]
    fn replaying() {
        let level: Level = r"
#######
#@ $ .#
#######
"
        .parse()
        .unwrap();
        let end = level
            .replay(vec![Dir::Right, Dir::Right, Dir::Right])
            .unwrap();
        assert!(level.is_solved(&end));
        assert_eq!(end.player_pos, Pos::new(1, 4));

        assert_eq!(
            level.replay(vec![Dir::Up]).unwrap_err(),
            ReplayErr::Blocked(0)
        );
        assert_eq!(
            level
                .replay(vec![Dir::Right, Dir::Right, Dir::Right, Dir::Right])
                .unwrap_err(),
            ReplayErr::Blocked(3)
        );
    }

    #[test]
    fn cell_kinds() {
        let level: Level = r"
#######
#+$*$.#
#######
"
        .parse()
        .unwrap();
        let state = &level.state;
        assert_eq!(level.cell_kind(state, Pos::new(0, 0)), CellKind::Wall);
        assert_eq!(level.cell_kind(state, Pos::new(1, 1)), CellKind::WorkerOnDock);
        assert_eq!(level.cell_kind(state, Pos::new(1, 2)), CellKind::Box);
        assert_eq!(level.cell_kind(state, Pos::new(1, 3)), CellKind::BoxOnDock);
        assert_eq!(level.cell_kind(state, Pos::new(1, 4)), CellKind::Box);
        assert_eq!(level.cell_kind(state, Pos::new(1, 5)), CellKind::Dock);
        assert_eq!(level.cell_kind(state, Pos::new(9, 9)), CellKind::Wall);
    }
}
