//! Undo/redo history management.
//!
//! ## Learning: A Cursor Over a Log
//!
//! Instead of separate undo and redo stacks, the history is one ordered
//! log of snapshots plus a cursor (`index`) pointing at the entry that
//! matches the live document:
//!
//! ```text
//!   entries:  [s0] [s1] [s2] [s3]
//!                        ^ index
//!   undo -> s1, redo -> s3
//! ```
//!
//! Committing while the cursor is not at the end drops everything after it
//! (linear undo, no redo tree).

use std::collections::VecDeque;

/// Default number of snapshots kept.
pub const DEFAULT_MAX_SIZE: usize = 50;

/// Manages undo/redo history as a bounded log of snapshots.
///
/// ## Design Decisions
///
/// 1. **Bounded history**: once full, the oldest snapshot is evicted and
///    that undo step is gone for good
/// 2. **Cursor stays put on eviction**: the cursor keeps pointing at the
///    newest retained entry
///
/// ## Learning: VecDeque
///
/// We use `VecDeque` instead of `Vec` because eviction pops from the front
/// while commits push to the back, both in O(1).
#[derive(Debug, Clone)]
pub struct History<T> {
    /// Committed snapshots, oldest first
    entries: VecDeque<T>,
    /// Position of the snapshot matching the live state
    index: usize,
    /// Maximum number of snapshots to keep
    max_size: usize,
}

impl<T: Clone> History<T> {
    /// Creates an empty history holding up to [`DEFAULT_MAX_SIZE`] snapshots.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    /// Creates an empty history with the given capacity (at least one).
    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size),
            index: 0,
            max_size,
        }
    }

    /// Records a snapshot of the state produced by a committed edit.
    ///
    /// Discards any redo branch. At capacity the oldest entry is evicted
    /// and the cursor is left where it is, which is the newest entry.
    pub fn commit(&mut self, snapshot: T) {
        if self.entries.is_empty() {
            self.entries.push_back(snapshot);
            self.index = 0;
            return;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);

        if self.entries.len() > self.max_size {
            self.entries.pop_front();
        } else {
            self.index += 1;
        }
    }

    /// Steps back one snapshot.
    ///
    /// Returns `None` (and changes nothing) when already at the oldest
    /// retained entry.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Steps forward one snapshot after an undo.
    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// Returns the snapshot under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index)
    }

    /// Returns true if there is an older snapshot to return to.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Returns true if an undone snapshot can be restored.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Returns the cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the capacity.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_commit_is_not_undoable() {
        let mut history = History::new();
        history.commit(vec!["header"]);

        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.current(), Some(&vec!["header"]));
    }

    #[test]
    fn test_undo_redo_walks_the_log() {
        let mut history = History::new();
        history.commit(1);
        history.commit(2);
        history.commit(3);

        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), Some(&3));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_commit_discards_redo_branch() {
        let mut history = History::new();
        history.commit("a");
        history.commit("b");
        history.commit("c");
        history.undo();
        history.undo();

        history.commit("d");

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&"a"));
    }

    #[test]
    fn test_eviction_keeps_cursor_on_newest() {
        let mut history = History::with_max_size(3);
        for i in 0..5 {
            history.commit(i);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current(), Some(&4));

        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_fifty_one_commits_lose_the_first() {
        let mut history = History::new();
        for i in 0..51 {
            history.commit(i);
        }

        assert_eq!(history.len(), DEFAULT_MAX_SIZE);
        let mut oldest = *history.current().unwrap();
        while let Some(snapshot) = history.undo() {
            oldest = *snapshot;
        }
        assert_eq!(oldest, 1);
    }

    #[test]
    fn test_snapshots_are_independent_of_caller() {
        let mut live = vec![String::from("hero")];
        let mut history = History::new();
        history.commit(live.clone());

        live[0].push_str("-edited");

        assert_eq!(history.current(), Some(&vec![String::from("hero")]));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut history = History::with_max_size(0);
        history.commit(1);
        history.commit(2);

        assert_eq!(history.max_size(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&2));
    }

    proptest! {
        #[test]
        fn prop_length_never_exceeds_capacity(commits in 0usize..200, cap in 1usize..60) {
            let mut history = History::with_max_size(cap);
            for i in 0..commits {
                history.commit(i);
                prop_assert!(history.len() <= cap);
                prop_assert_eq!(history.current(), Some(&i));
            }
        }

        #[test]
        fn prop_undo_then_redo_returns_to_same_snapshot(commits in 2usize..80) {
            let mut history = History::new();
            for i in 0..commits {
                history.commit(i);
            }
            let before = *history.current().unwrap();
            history.undo();
            prop_assert_eq!(history.redo().copied(), Some(before));
        }
    }
}
