use crate::data::Pos;

/// Worker position and box positions.
///
/// Boxes are kept sorted so two states with the same boxes compare and hash
/// equal no matter the order in which the boxes were moved.
#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct State {
    pub player_pos: Pos,
    pub boxes: Vec<Pos>,
}

impl State {
    pub fn new(player_pos: Pos, mut boxes: Vec<Pos>) -> State {
        // TODO use binary search when moving a single box instead of sorting everything
        boxes.sort();
        State { player_pos, boxes }
    }

    pub fn has_box(&self, pos: Pos) -> bool {
        self.boxes.binary_search(&pos).is_ok()
    }

    /// Copy of this state with the box at `from` moved to `to` and the player at `player_pos`
    pub(crate) fn with_push(&self, player_pos: Pos, from: Pos, to: Pos) -> State {
        let boxes = self
            .boxes
            .iter()
            .map(|&b| if b == from { to } else { b })
            .collect();
        State::new(player_pos, boxes)
    }

    pub(crate) fn with_player(&self, player_pos: Pos) -> State {
        State {
            player_pos,
            boxes: self.boxes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn box_order_does_not_matter() {
        let a = State::new(Pos::new(1, 1), vec![Pos::new(2, 3), Pos::new(1, 2)]);
        let b = State::new(Pos::new(1, 1), vec![Pos::new(1, 2), Pos::new(2, 3)]);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn pushing_keeps_boxes_sorted() {
        let state = State::new(Pos::new(1, 1), vec![Pos::new(1, 2), Pos::new(3, 3)]);
        let pushed = state.with_push(Pos::new(1, 2), Pos::new(1, 2), Pos::new(4, 2));
        assert_eq!(pushed.boxes, vec![Pos::new(3, 3), Pos::new(4, 2)]);
        assert!(pushed.has_box(Pos::new(4, 2)));
        assert!(!pushed.has_box(Pos::new(1, 2)));
    }
}
