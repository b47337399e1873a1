use std::fmt::{self, Debug, Display, Formatter};

use crate::config::Format;
use crate::data::{CellKind, Pos};
use crate::level::Level;
use crate::state::State;

/// Text renderer - draws a level with an arbitrary state
pub struct MapFormatter<'a> {
    level: &'a Level,
    state: &'a State,
    format: Format,
}

impl<'a> MapFormatter<'a> {
    pub(crate) fn new(level: &'a Level, state: &'a State, format: Format) -> Self {
        Self {
            level,
            state,
            format,
        }
    }

    fn write_to_formatter(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for r in 0..self.level.rows() {
            // don't print trailing empty cells to match the input level strings
            let last_non_empty = (0..self.level.cols())
                .rev()
                .find(|&c| self.level.cell_kind(self.state, Pos::new(r, c)) != CellKind::Floor);

            if let Some(last) = last_non_empty {
                for c in 0..=last {
                    let kind = self.level.cell_kind(self.state, Pos::new(r, c));
                    match self.format {
                        Format::Custom => Self::write_cell_custom(kind, f)?,
                        Format::Xsb => Self::write_cell_xsb(kind, f)?,
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_cell_custom(kind: CellKind, f: &mut Formatter<'_>) -> fmt::Result {
        match kind {
            CellKind::Wall => write!(f, "<>"),
            CellKind::Floor => write!(f, "  "),
            CellKind::Dock => write!(f, " _"),
            CellKind::Box => write!(f, "B "),
            CellKind::BoxOnDock => write!(f, "B_"),
            CellKind::Worker => write!(f, "P "),
            CellKind::WorkerOnDock => write!(f, "P_"),
        }
    }

    fn write_cell_xsb(kind: CellKind, f: &mut Formatter<'_>) -> fmt::Result {
        match kind {
            CellKind::Wall => write!(f, "#"),
            CellKind::Floor => write!(f, " "),
            CellKind::Dock => write!(f, "."),
            CellKind::Box => write!(f, "$"),
            CellKind::BoxOnDock => write!(f, "*"),
            CellKind::Worker => write!(f, "@"),
            CellKind::WorkerOnDock => write!(f, "+"),
        }
    }
}

impl<'a> Display for MapFormatter<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_to_formatter(f)
    }
}

impl<'a> Debug for MapFormatter<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
