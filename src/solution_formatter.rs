use std::fmt::{self, Debug, Display, Formatter};

use crate::config::Format;
use crate::level::Level;
use crate::moves::Moves;

/// Replays moves from the initial state and draws the level after each push
/// (or after every move if `include_steps` is set).
pub struct SolutionFormatter<'a> {
    level: &'a Level,
    moves: &'a Moves,
    include_steps: bool,
    format: Format,
}

impl<'a> SolutionFormatter<'a> {
    pub(crate) fn new(
        level: &'a Level,
        moves: &'a Moves,
        include_steps: bool,
        format: Format,
    ) -> Self {
        Self {
            level,
            moves,
            include_steps,
            format,
        }
    }
}

impl Display for SolutionFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.level.format(self.format))?;
        let mut last_state = self.level.state.clone();
        for &mov in self.moves {
            // moves from a different level are a caller bug, stop drawing instead of panicking
            let (new_state, is_push) = match self.level.apply(&last_state, mov.dir) {
                Some(next) => next,
                None => return Err(fmt::Error),
            };
            if is_push || self.include_steps {
                writeln!(
                    f,
                    "{}",
                    self.level.format_with_state(self.format, &new_state)
                )?;
            }
            last_state = new_state;
        }
        Ok(())
    }
}

impl Debug for SolutionFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
