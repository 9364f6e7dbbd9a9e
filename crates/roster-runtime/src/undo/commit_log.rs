#![forbid(unsafe_code)]

//! Cross-store commit order log.
//!
//! Each store keeps its own [`SnapshotHistory`](super::SnapshotHistory), but
//! undo has to know which stores were committed at each step and in which
//! order. [`CommitOrderLog`] records one [`CommitEntry`] per commit, tagged
//! with the set of stores it froze, on a dual undo/redo stack.
//!
//! ```text
//! record_commit({records})
//! record_commit({expenses})
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [#1 {records}, #2 {expenses}]     │
//! │ Redo Stack: []                                 │
//! └───────────────────────────────────────────────┘
//!
//! pop_for_undo() -> #2 {expenses}
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [#1 {records}]                    │
//! │ Redo Stack: [#2 {expenses}]                    │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Actions
//!
//! Every entry belongs to an action. [`record_commit`](CommitOrderLog::record_commit)
//! opens a new action; [`record_chained`](CommitOrderLog::record_chained) adds
//! an entry to the action on top of the undo stack. Consecutive entries of
//! one action are undone and redone together by the coordinator.
//!
//! # Invariants
//!
//! 1. `seq` strictly increases in recording order.
//! 2. The redo stack is cleared whenever an entry is recorded.
//! 3. Entries are moved between stacks unchanged.

use std::fmt;

use roster_core::TagSet;

use super::error::HistoryError;

/// Identifier of one logical user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// One recorded commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitEntry {
    /// Monotonic recording sequence number.
    pub seq: u64,
    /// Stores frozen by this commit.
    pub tags: TagSet,
    /// The action this commit belongs to.
    pub action: ActionId,
}

/// Ordered record of which stores were committed at each step.
#[derive(Debug, Default)]
pub struct CommitOrderLog {
    undo_stack: Vec<CommitEntry>,
    redo_stack: Vec<CommitEntry>,
    next_seq: u64,
    next_action: u64,
    /// Whether the top of the undo stack was recorded since the last
    /// undo or redo and can still be chained onto.
    chain_open: bool,
}

impl CommitOrderLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record a commit that starts a new action.
    pub fn record_commit(&mut self, tags: TagSet) -> CommitEntry {
        let action = ActionId(self.next_action);
        self.next_action += 1;
        self.push(tags, action)
    }

    /// Record a commit that continues the action on top of the undo stack.
    ///
    /// Only an action recorded since the last undo or redo can be
    /// continued; otherwise this starts a new action.
    pub fn record_chained(&mut self, tags: TagSet) -> CommitEntry {
        match self.undo_stack.last() {
            Some(top) if self.chain_open => {
                let action = top.action;
                self.push(tags, action)
            }
            _ => self.record_commit(tags),
        }
    }

    fn push(&mut self, tags: TagSet, action: ActionId) -> CommitEntry {
        self.redo_stack.clear();
        let entry = CommitEntry {
            seq: self.next_seq,
            tags,
            action,
        };
        self.next_seq += 1;
        self.undo_stack.push(entry);
        self.chain_open = true;
        entry
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Take the most recent entry off the undo side and move it to the redo side.
    pub fn pop_for_undo(&mut self) -> Result<CommitEntry, HistoryError> {
        let entry = self.undo_stack.pop().ok_or(HistoryError::NoUndoableState)?;
        self.redo_stack.push(entry);
        self.chain_open = false;
        Ok(entry)
    }

    /// Take the most recently undone entry and move it back to the undo side.
    pub fn pop_for_redo(&mut self) -> Result<CommitEntry, HistoryError> {
        let entry = self.redo_stack.pop().ok_or(HistoryError::NoRedoableState)?;
        self.undo_stack.push(entry);
        self.chain_open = false;
        Ok(entry)
    }

    /// The next `n` entries [`pop_for_undo`](Self::pop_for_undo) would return,
    /// in that order. Shorter than `n` if fewer remain.
    pub fn peek_undo(&self, n: usize) -> impl Iterator<Item = &CommitEntry> {
        self.undo_stack.iter().rev().take(n)
    }

    /// The next `n` entries [`pop_for_redo`](Self::pop_for_redo) would return.
    pub fn peek_redo(&self, n: usize) -> impl Iterator<Item = &CommitEntry> {
        self.redo_stack.iter().rev().take(n)
    }

    /// Number of consecutive entries on top of the undo side that share
    /// one action.
    #[must_use]
    pub fn steps_for_last_action(&self) -> usize {
        Self::run_length(&self.undo_stack)
    }

    /// Number of consecutive entries on top of the redo side that share
    /// one action.
    #[must_use]
    pub fn steps_for_next_redo(&self) -> usize {
        Self::run_length(&self.redo_stack)
    }

    fn run_length(stack: &[CommitEntry]) -> usize {
        match stack.last() {
            Some(top) => stack
                .iter()
                .rev()
                .take_while(|entry| entry.action == top.action)
                .count(),
            None => 0,
        }
    }

    // ========================================================================
    // Query
    // ========================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undoable entries, oldest first.
    #[must_use]
    pub fn undo_entries(&self) -> &[CommitEntry] {
        &self.undo_stack
    }

    /// Redoable entries, next-to-redo last.
    #[must_use]
    pub fn redo_entries(&self) -> &[CommitEntry] {
        &self.redo_stack
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Remove the oldest undoable entry.
    pub fn evict_oldest(&mut self) -> Option<CommitEntry> {
        if self.undo_stack.is_empty() {
            None
        } else {
            Some(self.undo_stack.remove(0))
        }
    }
}
