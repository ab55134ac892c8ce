use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::GameState;

/// Undo/redo over whole-board snapshots.
///
/// `states[cursor]` is the current board. Pushing after an undo drops the
/// redo branch; past `cap` entries the oldest snapshots are evicted and the
/// cursor shifts with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStack {
    states: VecDeque<GameState>,
    cursor: usize,
    cap: usize,
    /// The deal this stack started from; `reset` returns here even after the
    /// head has been evicted.
    initial: GameState,
}

impl HistoryStack {
    pub fn new(initial: GameState, cap: usize) -> Self {
        let mut states = VecDeque::new();
        states.push_back(initial.clone());
        HistoryStack {
            states,
            cursor: 0,
            cap: cap.max(1),
            initial,
        }
    }

    /// The board everything renders from.
    pub fn current(&self) -> &GameState {
        &self.states[self.cursor]
    }

    pub fn initial(&self) -> &GameState {
        &self.initial
    }

    pub fn push(&mut self, state: GameState) {
        self.states.truncate(self.cursor + 1);
        self.states.push_back(state);
        while self.states.len() > self.cap {
            self.states.pop_front();
        }
        self.cursor = self.states.len() - 1;
    }

    /// Step back one snapshot. `None` when already at the oldest retained
    /// state.
    pub fn undo(&mut self) -> Option<&GameState> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&GameState> {
        if self.cursor + 1 >= self.states.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Back to the deal, forgetting every snapshot.
    pub fn reset(&mut self) {
        self.states.clear();
        self.states.push_back(self.initial.clone());
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Checks a stack that came from outside (a save file): non-empty, cursor
    /// in range, cap respected, every snapshot a full deck from one seed.
    pub fn is_structurally_valid(&self) -> bool {
        let seed = self.initial.seed;
        !self.states.is_empty()
            && self.cap >= 1
            && self.states.len() <= self.cap
            && self.cursor < self.states.len()
            && self.initial.is_consistent()
            && self
                .states
                .iter()
                .all(|s| s.seed == seed && s.is_consistent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;

    /// Snapshots that differ only by move counter are enough to track the
    /// cursor.
    fn step(state: &GameState) -> GameState {
        let mut next = state.clone();
        next.moves += 1;
        next
    }

    fn deal() -> GameState {
        Rules::klondike(1).deal(7)
    }

    #[test]
    fn undo_at_start_is_a_no_op() {
        let mut history = HistoryStack::new(deal(), 10);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn undo_redo_walk_the_cursor() {
        let mut history = HistoryStack::new(deal(), 10);
        let s1 = step(history.current());
        history.push(s1.clone());
        let s2 = step(&s1);
        history.push(s2.clone());

        assert_eq!(history.undo(), Some(&s1));
        assert_eq!(history.undo(), Some(&deal()));
        assert!(history.undo().is_none());
        assert_eq!(history.redo(), Some(&s1));
        assert_eq!(history.redo(), Some(&s2));
        assert!(history.redo().is_none());
    }

    #[test]
    fn push_after_undo_drops_redo_branch() {
        let mut history = HistoryStack::new(deal(), 10);
        let s1 = step(history.current());
        history.push(s1.clone());
        history.push(step(&s1));
        history.undo();

        let mut other = s1.clone();
        other.moves = 99;
        history.push(other.clone());
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.current(), &other);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn cap_evicts_oldest_and_rebases_cursor() {
        let mut history = HistoryStack::new(deal(), 3);
        let mut state = deal();
        for _ in 0..5 {
            state = step(&state);
            history.push(state.clone());
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current().moves, 5);
        history.undo();
        history.undo();
        assert_eq!(history.current().moves, 3);
        assert!(history.undo().is_none());
    }

    #[test]
    fn reset_returns_to_the_deal_even_after_eviction() {
        let mut history = HistoryStack::new(deal(), 2);
        let mut state = deal();
        for _ in 0..4 {
            state = step(&state);
            history.push(state.clone());
        }
        history.reset();
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), &deal());
        assert!(!history.can_undo());
    }

    #[test]
    fn structural_validation() {
        let rules = Rules::klondike(1);
        let mut history = HistoryStack::new(deal(), 10);
        let next = rules.draw_from_stock(history.current()).unwrap();
        history.push(next);
        assert!(history.is_structurally_valid());

        let mut broken = history.clone();
        broken.cursor = 5;
        assert!(!broken.is_structurally_valid());

        let mut foreign = history.clone();
        foreign.push(rules.deal(8));
        assert!(!foreign.is_structurally_valid());

        let mut lossy = history.clone();
        let mut bad = lossy.current().clone();
        bad.stock.pop();
        lossy.push(bad);
        assert!(!lossy.is_structurally_valid());
    }
}
