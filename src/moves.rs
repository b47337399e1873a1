use std::fmt::{self, Debug, Display, Formatter};
use std::iter::FromIterator;
use std::slice;
use std::str::FromStr;

use crate::data::{Dir, DIRECTIONS};

/// One worker step, `is_push` when it moved a box
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub dir: Dir,
    pub is_push: bool,
}

impl Move {
    pub fn new(dir: Dir, is_push: bool) -> Self {
        Move { dir, is_push }
    }

    fn lurd(self) -> char {
        let c = match self.dir {
            Dir::Up => 'u',
            Dir::Right => 'r',
            Dir::Down => 'd',
            Dir::Left => 'l',
        };
        if self.is_push {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    fn from_lurd(c: char) -> Option<Self> {
        let lower = c.to_ascii_lowercase();
        DIRECTIONS
            .iter()
            .find(|dir| Move::new(**dir, false).lurd() == lower)
            .map(|&dir| Move::new(dir, c.is_ascii_uppercase()))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lurd())
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A plan in LURD notation - lowercase steps, uppercase pushes
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Moves(Vec<Move>);

impl Moves {
    pub fn new(moves: Vec<Move>) -> Self {
        Moves(moves)
    }

    pub fn move_cnt(&self) -> usize {
        self.0.len()
    }

    pub fn push_cnt(&self) -> usize {
        self.0.iter().filter(|m| m.is_push).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bare controls without the push flags
    pub fn dirs(&self) -> Vec<Dir> {
        self.0.iter().map(|m| m.dir).collect()
    }

    pub(crate) fn add(&mut self, mov: Move) {
        self.0.push(mov);
    }

    pub(crate) fn extend(&mut self, moves: &Moves) {
        self.0.extend_from_slice(&moves.0);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn iter(&self) -> slice::Iter<'_, Move> {
        self.0.iter()
    }
}

impl FromIterator<Move> for Moves {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Moves(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Moves {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Character that isn't one of `lurdLURD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMove(pub char);

impl Display for InvalidMove {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid move: {:?}", self.0)
    }
}

impl std::error::Error for InvalidMove {}

impl FromStr for Moves {
    type Err = InvalidMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| Move::from_lurd(c).ok_or(InvalidMove(c)))
            .collect()
    }
}

impl Display for Moves {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|mov| write!(f, "{}", mov))
    }
}

impl Debug for Moves {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lurd_text() {
        let moves: Moves = "lUrDdRuL".parse().unwrap();
        assert_eq!(moves.to_string(), "lUrDdRuL");
        assert_eq!(moves.iter().next(), Some(&Move::new(Dir::Left, false)));
        assert_eq!(moves.iter().nth(1), Some(&Move::new(Dir::Up, true)));

        assert_eq!("".parse::<Moves>().unwrap(), Moves::default());
        assert_eq!("rRx".parse::<Moves>(), Err(InvalidMove('x')));
        assert_eq!("r r".parse::<Moves>(), Err(InvalidMove(' ')));
    }

    #[test]
    fn counts() {
        let mut moves: Moves = "uuRRd".parse().unwrap();
        assert_eq!((moves.move_cnt(), moves.push_cnt()), (5, 2));

        moves.extend(&"LLl".parse().unwrap());
        assert_eq!((moves.move_cnt(), moves.push_cnt()), (8, 4));
        assert_eq!(moves.dirs()[5..], [Dir::Left, Dir::Left, Dir::Left]);

        moves.truncate(3);
        moves.add(Move::new(Dir::Down, true));
        assert_eq!(moves.to_string(), "uuRD");
        assert!(!moves.is_empty());
    }
}
