use crate::data::Pos;
use crate::level::Level;
use crate::moves::{Move, Moves};
use crate::solver::sat::atoms::{Atom, AtomTable};
use crate::solver::sat::solver::Model;
use crate::solver::SolverErr;

/// True move and push atoms ordered by timestep
pub(crate) fn decode_actions(atoms: &AtomTable, model: &Model) -> Result<Moves, SolverErr> {
    let mut actions: Vec<(u32, Pos, Pos, bool)> = atoms
        .iter()
        .filter(|&(var, _)| model.value(var))
        .filter_map(|(_, atom)| match atom {
            Atom::Move(from, to, t) => Some((t, from, to, false)),
            Atom::Push(from, to, t) => Some((t, from, to, true)),
            _ => None,
        })
        .collect();
    actions.sort();

    let mut moves = Moves::default();
    let mut last_step = None;
    for (t, from, to, is_push) in actions {
        if last_step == Some(t) {
            return Err(SolverErr::Sat(format!("multiple actions at step {}", t)));
        }
        last_step = Some(t);
        let dir = from
            .dir_to(to)
            .ok_or_else(|| SolverErr::Sat(format!("action from {} to {}", from, to)))?;
        moves.add(Move::new(dir, is_push));
    }
    Ok(moves)
}

/// Differences between consecutive worker positions, a move is a push if the target held a box
pub(crate) fn decode_worker_positions(
    level: &Level,
    horizon: u32,
    atoms: &AtomTable,
    model: &Model,
) -> Result<Moves, SolverErr> {
    let holds = |atom| atoms.get(atom).map_or(false, |var| model.value(var));

    let cells = level.playable();
    let mut positions = Vec::new();
    for t in 0..=horizon {
        let mut found = cells.iter().filter(|&&pos| holds(Atom::WorkerAt(pos, t)));
        match (found.next(), found.next()) {
            (Some(&pos), None) => positions.push(pos),
            (None, _) => return Err(SolverErr::Sat(format!("no worker at step {}", t))),
            (Some(_), Some(_)) => {
                return Err(SolverErr::Sat(format!("multiple workers at step {}", t)))
            }
        }
    }

    let mut moves = Moves::default();
    for (t, pair) in positions.windows(2).enumerate() {
        let (cur, next) = (pair[0], pair[1]);
        if cur == next {
            // idle step
            continue;
        }
        let dir = cur
            .dir_to(next)
            .ok_or_else(|| SolverErr::Sat(format!("worker jumped from {} to {}", cur, next)))?;
        let is_push = holds(Atom::BoxAt(next, t as u32));
        moves.add(Move::new(dir, is_push));
    }
    Ok(moves)
}
