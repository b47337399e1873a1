use std::collections::VecDeque;

use fnv::FnvHashMap;
use log::trace;

use crate::data::Pos;
use crate::level::Level;
use crate::moves::{Move, Moves};
use crate::solver::SolverErr;
use crate::state::State;

// Terminology:
// move = changing player position by one cell
// push = a move that changes a box position
// step = a move that doesn't change a box position

/// Turns a sequence of states into moves.
///
/// Consecutive states are normally one move apart. Anything further apart is bridged by walking,
/// followed by a push if exactly one box changed position.
pub(crate) fn moves_from_states(level: &Level, states: &[State]) -> Result<Moves, SolverErr> {
    let mut moves = Moves::default();
    for pair in states.windows(2) {
        let new_moves = moves_between_states(level, &pair[0], &pair[1])?;
        moves.extend(&new_moves);
    }
    trace!("Translated {} states into {} moves", states.len(), moves.move_cnt());
    Ok(moves)
}

fn moves_between_states(level: &Level, old: &State, new: &State) -> Result<Moves, SolverErr> {
    let is_push = old.boxes != new.boxes;
    if let Some(dir) = old.player_pos.dir_to(new.player_pos) {
        return Ok(Moves::new(vec![Move::new(dir, is_push)]));
    }

    if is_push {
        let mut old_iter = old.boxes.iter().filter(|&&b| !new.has_box(b));
        let mut new_iter = new.boxes.iter().filter(|&&b| !old.has_box(b));
        if let (Some(&old_box_pos), None, Some(&new_box_pos), None) =
            (old_iter.next(), old_iter.next(), new_iter.next(), new_iter.next())
        {
            if let Some(push_dir) = old_box_pos.dir_to(new_box_pos) {
                let before_push = old_box_pos + push_dir.inverse();
                let mut moves = player_steps(level, old, old.player_pos, before_push)?;
                moves.add(Move::new(push_dir, true));
                let after_push = player_steps(level, new, old_box_pos, new.player_pos)?;
                moves.extend(&after_push);
                return Ok(moves);
            }
        }
    }

    player_steps(level, old, old.player_pos, new.player_pos)
}

/// Shortest walk between two cells that doesn't touch any box in `state`
fn player_steps(level: &Level, state: &State, src_pos: Pos, dest_pos: Pos) -> Result<Moves, SolverErr> {
    if src_pos == dest_pos {
        return Ok(Moves::default());
    }

    let mut prevs = FnvHashMap::default();
    prevs.insert(src_pos, src_pos);

    let mut to_visit = VecDeque::new();
    to_visit.push_back(src_pos);

    'bfs: loop {
        let player_pos = match to_visit.pop_front() {
            Some(pos) => pos,
            None => {
                return Err(SolverErr::UnreachableWalk {
                    from: src_pos,
                    to: dest_pos,
                })
            }
        };

        for &new_player_pos in &player_pos.neighbors() {
            if !level.is_free(new_player_pos)
                || state.has_box(new_player_pos)
                || prevs.contains_key(&new_player_pos)
            {
                continue;
            }

            prevs.insert(new_player_pos, player_pos);
            if new_player_pos == dest_pos {
                break 'bfs;
            }
            to_visit.push_back(new_player_pos);
        }
    }

    let mut positions = vec![dest_pos];
    let mut cur = dest_pos;
    while cur != src_pos {
        cur = prevs[&cur];
        positions.push(cur);
    }
    positions.reverse();

    let mut moves = Moves::default();
    for pair in positions.windows(2) {
        // neighbors are always one step apart
        if let Some(dir) = pair[0].dir_to(pair[1]) {
            moves.add(Move::new(dir, false));
        }
    }
    Ok(moves)
}
