use std::fmt::{self, Display, Formatter};
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCell {
    Wall,
    Empty,
    Goal,
}

impl Default for MapCell {
    fn default() -> Self {
        MapCell::Empty
    }
}

/// What a renderer needs to know about a cell - static layer and contents combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Floor,
    Dock,
    Box,
    BoxOnDock,
    Worker,
    WorkerOnDock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub r: i32,
    pub c: i32,
}

impl Pos {
    pub fn new(r: i32, c: i32) -> Pos {
        Pos { r, c }
    }

    /// Manhattan distance
    pub fn dist(self, other: Pos) -> i32 {
        (self.r - other.r).abs() + (self.c - other.c).abs()
    }

    /// Up, right, down, left - order matches `DIRECTIONS`
    pub fn neighbors(self) -> [Pos; 4] {
        [
            self + Dir::Up,
            self + Dir::Right,
            self + Dir::Down,
            self + Dir::Left,
        ]
    }

    /// Direction of a single step from `self` to `other`, `None` if they're not adjacent.
    pub fn dir_to(self, other: Pos) -> Option<Dir> {
        Dir::from_offset(other.r - self.r, other.c - self.c)
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.r, self.c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

pub const DIRECTIONS: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

impl Dir {
    /// (row, col) offset of one step in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Right => (0, 1),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
        }
    }

    pub fn from_offset(dr: i32, dc: i32) -> Option<Dir> {
        match (dr, dc) {
            (-1, 0) => Some(Dir::Up),
            (0, 1) => Some(Dir::Right),
            (1, 0) => Some(Dir::Down),
            (0, -1) => Some(Dir::Left),
            _ => None,
        }
    }

    pub fn inverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Dir::Up => write!(f, "u"),
            Dir::Right => write!(f, "r"),
            Dir::Down => write!(f, "d"),
            Dir::Left => write!(f, "l"),
        }
    }
}

impl Add<Dir> for Pos {
    type Output = Pos;

    fn add(self, dir: Dir) -> Pos {
        let (dr, dc) = dir.offset();
        Pos {
            r: self.r + dr,
            c: self.c + dc,
        }
    }
}
