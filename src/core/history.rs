//! Bounded linear undo/redo history of content snapshots

use std::collections::VecDeque;

/// Smallest bound that still leaves room for one undo step
const MIN_LIMIT: usize = 2;

/// Linear snapshot history with a cursor on the displayed entry
///
/// Invariant: `cursor < snapshots.len()` and the history is never empty.
#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: VecDeque<String>,
    cursor: usize,
    limit: usize,
}

impl EditHistory {
    /// Create a history holding only `initial`, keeping at most `limit` snapshots
    pub fn new(initial: impl Into<String>, limit: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial.into());
        Self {
            snapshots,
            cursor: 0,
            limit: limit.max(MIN_LIMIT),
        }
    }

    /// Drop every snapshot and start over from `content`
    pub fn reset(&mut self, content: impl Into<String>) {
        self.snapshots.clear();
        self.snapshots.push_back(content.into());
        self.cursor = 0;
    }

    /// Record a new snapshot, discarding the redo branch
    ///
    /// Returns false when `content` equals the current snapshot.
    pub fn push(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.current() == content {
            return false;
        }

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(content);
        while self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        true
    }

    /// Step back one snapshot
    pub fn undo(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one snapshot
    pub fn redo(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// The snapshot at the cursor
    pub fn current(&self) -> &str {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// All snapshots, oldest first
    #[cfg(test)]
    pub fn snapshots(&self) -> Vec<&str> {
        self.snapshots.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(entries: &[&str]) -> EditHistory {
        let mut history = EditHistory::new(entries[0], 100);
        for entry in &entries[1..] {
            history.push(*entry);
        }
        history
    }

    #[test]
    fn test_push_after_undo_truncates_redo_branch() {
        let mut history = history_of(&["c0", "c1", "c2"]);
        history.undo();
        assert_eq!(history.cursor(), 1);

        history.push("c3");
        assert_eq!(history.snapshots(), vec!["c0", "c1", "c3"]);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut history = history_of(&["", "a"]);
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), 1);

        assert_eq!(history.undo(), Some(""));
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current(), "");
    }

    #[test]
    fn test_identical_push_is_ignored() {
        let mut history = history_of(&["", "a"]);
        assert!(!history.push("a"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = EditHistory::new("0", 3);
        history.push("1");
        history.push("2");
        history.push("3");
        assert_eq!(history.snapshots(), vec!["1", "2", "3"]);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current(), "3");
    }

    #[test]
    fn test_limit_has_a_floor() {
        let history = EditHistory::new("", 0);
        assert_eq!(history.limit(), 2);
    }

    #[test]
    fn test_reset() {
        let mut history = history_of(&["a", "b", "c"]);
        history.reset("x");
        assert_eq!(history.snapshots(), vec!["x"]);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
