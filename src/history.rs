//! Linear undo/redo history over machine snapshots.
//!
//! `past` holds snapshots oldest-first and always ends with the snapshot of the
//! present state. `future` holds undone snapshots, most recently undone last. Pushing
//! a new snapshot discards `future`, so the timeline never branches.

use std::collections::VecDeque;
use tracing::trace;

use crate::machine::Snapshot;
use crate::types::DEFAULT_MAX_HISTORY;

#[derive(Debug, Clone)]
pub struct HistoryManager {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    max_history: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl HistoryManager {
    /// Creates an empty history keeping at most `max_history` past snapshots.
    ///
    /// The present state is always kept, so a cap below 1 is raised to 1.
    pub fn new(max_history: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    /// Records `snapshot` as the present state and drops the redo branch.
    ///
    /// The oldest snapshot is evicted once `max_history` is exceeded.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        self.future.clear();

        while self.past.len() > self.max_history {
            self.past.pop_front();
            trace!(max_history = self.max_history, "history cap reached");
        }
    }

    /// Steps back one entry and returns the snapshot that is now the present state.
    ///
    /// Returns `None` when fewer than two snapshots are recorded.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }

        let current = self.past.pop_back()?;
        self.future.push(current);
        self.past.back()
    }

    /// Re-applies the most recently undone snapshot and returns it.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.future.pop()?;
        self.past.push_back(next);
        self.past.back()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of past snapshots, the present one included.
    pub fn len(&self) -> usize {
        self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// The snapshot of the present state, if any.
    pub fn current(&self) -> Option<&Snapshot> {
        self.past.back()
    }

    /// Past snapshots, oldest first.
    pub fn past(&self) -> &VecDeque<Snapshot> {
        &self.past
    }

    pub fn future(&self) -> &[Snapshot] {
        &self.future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::Tape;

    fn snap(step_count: usize) -> Snapshot {
        Snapshot {
            tape: Tape::from_input(&step_count.to_string(), '_'),
            head_position: step_count as i64,
            current_state: format!("q{}", step_count),
            halted: false,
            accepted: false,
            step_count,
        }
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = HistoryManager::default();

        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.max_history(), 1000);
    }

    #[test]
    fn test_single_entry_cannot_undo() {
        let mut history = HistoryManager::default();
        history.push(snap(0));

        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_undo_returns_previous_state() {
        let mut history = HistoryManager::default();
        history.push(snap(0));
        history.push(snap(1));
        history.push(snap(2));

        assert_eq!(history.undo(), Some(&snap(1)));
        assert_eq!(history.len(), 2);
        assert!(history.can_redo());

        assert_eq!(history.undo(), Some(&snap(0)));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_redo_returns_undone_state() {
        let mut history = HistoryManager::default();
        history.push(snap(0));
        history.push(snap(1));

        history.undo();
        assert_eq!(history.redo(), Some(&snap(1)));
        assert_eq!(history.current(), Some(&snap(1)));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_redo_order_after_multiple_undos() {
        let mut history = HistoryManager::default();
        for i in 0..4 {
            history.push(snap(i));
        }

        history.undo();
        history.undo();
        assert_eq!(history.redo(), Some(&snap(2)));
        assert_eq!(history.redo(), Some(&snap(3)));
    }

    #[test]
    fn test_push_clears_redo_branch() {
        let mut history = HistoryManager::default();
        history.push(snap(0));
        history.push(snap(1));
        history.undo();
        assert!(history.can_redo());

        history.push(snap(5));
        assert!(!history.can_redo());
        assert_eq!(history.past(), &[snap(0), snap(5)]);
    }

    #[test]
    fn test_respects_max_history() {
        let mut history = HistoryManager::new(3);
        for i in 0..5 {
            history.push(snap(i));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.past(), &[snap(2), snap(3), snap(4)]);
    }

    #[test]
    fn test_zero_cap_still_keeps_present_state() {
        let mut history = HistoryManager::new(0);
        history.push(snap(0));
        history.push(snap(1));

        assert_eq!(history.max_history(), 1);
        assert_eq!(history.current(), Some(&snap(1)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryManager::default();
        history.push(snap(0));
        history.push(snap(1));
        history.undo();

        history.clear();
        assert!(history.is_empty());
        assert!(history.future().is_empty());
    }
}
