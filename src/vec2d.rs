use std::ops::Index;

use crate::data::Pos;

/// Row-major 2D grid indexed by `Pos`.
///
/// Indexing panics on out of bounds positions, use `get` when a position
/// might be outside (levels don't have to be surrounded by walls).
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Vec2d<T> {
    data: Vec<T>,
    rows: i32,
    cols: i32,
}

impl<T> Vec2d<T> {
    pub(crate) fn rows(&self) -> i32 {
        self.rows
    }

    pub(crate) fn cols(&self) -> i32 {
        self.cols
    }

    pub(crate) fn contains(&self, pos: Pos) -> bool {
        pos.r >= 0 && pos.c >= 0 && pos.r < self.rows && pos.c < self.cols
    }

    pub(crate) fn get(&self, pos: Pos) -> Option<&T> {
        if self.contains(pos) {
            Some(&self.data[self.index_of(pos)])
        } else {
            None
        }
    }

    /// All positions in row-major order
    pub(crate) fn positions(&self) -> impl Iterator<Item = Pos> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| (0..cols).map(move |c| Pos::new(r, c)))
    }

    fn index_of(&self, pos: Pos) -> usize {
        debug_assert!(self.contains(pos), "{} out of bounds", pos);
        (pos.r * self.cols + pos.c) as usize
    }
}

impl<T: Clone + Default> Vec2d<T> {
    /// Pads all rows to the length of the longest one.
    pub(crate) fn new(grid: &[Vec<T>]) -> Self {
        let max_cols = grid.iter().map(|row| row.len()).max().unwrap_or(0);
        let mut data = Vec::with_capacity(grid.len() * max_cols);
        for row in grid {
            data.extend(row.iter().cloned());
            for _ in row.len()..max_cols {
                data.push(T::default());
            }
        }
        Vec2d {
            data,
            rows: grid.len() as i32,
            cols: max_cols as i32,
        }
    }
}

impl<T> Index<Pos> for Vec2d<T> {
    type Output = T;

    fn index(&self, index: Pos) -> &Self::Output {
        &self.data[self.index_of(index)]
    }
}
