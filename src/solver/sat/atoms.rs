use fnv::FnvHashMap;

use crate::data::Pos;

/// Proposition of the bounded planning formula.
///
/// `t` is the timestep the fluent holds at, or the step an action starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Atom {
    WorkerAt(Pos, u32),
    BoxAt(Pos, u32),
    /// Worker walks from the first cell to the second
    Move(Pos, Pos, u32),
    /// Worker steps from the first cell to the second, pushing the box there one cell further
    Push(Pos, Pos, u32),
    /// Every dock holds a box at this timestep
    Goal(u32),
}

/// Maps atoms to solver variables, numbered from 1 in order of first use.
#[derive(Debug, Default)]
pub(crate) struct AtomTable {
    vars: FnvHashMap<Atom, i32>,
    atoms: Vec<Atom>,
}

impl AtomTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Variable for `atom`, allocated on first request
    pub(crate) fn var(&mut self, atom: Atom) -> i32 {
        if let Some(&var) = self.vars.get(&atom) {
            return var;
        }
        self.atoms.push(atom);
        let var = self.atoms.len() as i32;
        self.vars.insert(atom, var);
        var
    }

    /// Variable for `atom` if it was ever requested
    pub(crate) fn get(&self, atom: Atom) -> Option<i32> {
        self.vars.get(&atom).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.atoms.len()
    }

    /// All atoms with their variables in allocation order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (i32, Atom)> + '_ {
        self.atoms
            .iter()
            .enumerate()
            .map(|(i, &atom)| (i as i32 + 1, atom))
    }
}
