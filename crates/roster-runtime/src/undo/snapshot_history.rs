#![forbid(unsafe_code)]

//! Pointer-addressed snapshot history.
//!
//! [`SnapshotHistory`] keeps an ordered sequence of immutable snapshots and a
//! cursor naming the current one. Snapshots are held as [`Arc<T>`]; when `T`
//! is a persistent collection (`im::Vector`, `im::HashMap`) each commit shares
//! almost all of its memory with the previous snapshot.
//!
//! # Architecture
//!
//! ```text
//! commit(s3)
//! ┌──────────────────────────────────────────────┐
//! │ Snapshots: [s0, s1, s2, s3]                  │
//! │ Cursor:                 ^                    │
//! └──────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌──────────────────────────────────────────────┐
//! │ Snapshots: [s0, s1, s2, s3]                  │
//! │ Cursor:         ^                            │
//! └──────────────────────────────────────────────┘
//!
//! commit(s4): truncates everything past the cursor
//! ┌──────────────────────────────────────────────┐
//! │ Snapshots: [s0, s1, s4]                      │
//! │ Cursor:             ^                        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. The sequence is never empty; it starts with the initial state.
//! 2. `cursor < snapshots.len()` after every operation.
//! 3. `commit` discards every snapshot past the cursor before appending.
//! 4. `snapshots.len() <= config.max_depth` after every commit.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::error::HistoryError;

/// An immutable full-state snapshot.
pub type Snapshot<T> = Arc<T>;

/// Configuration for a snapshot history.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SnapshotConfig {
    /// Maximum number of snapshots to retain, including the current one.
    /// Unlimited by default; when set, the oldest snapshots are evicted once
    /// the limit is exceeded. A value of zero is treated as one.
    pub max_depth: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl SnapshotConfig {
    /// Create a new configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create an unlimited configuration.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    fn effective_depth(&self) -> usize {
        self.max_depth.max(1)
    }
}

/// A linear undo/redo history of full-state snapshots.
pub struct SnapshotHistory<T> {
    snapshots: VecDeque<Snapshot<T>>,
    cursor: usize,
    config: SnapshotConfig,
}

impl<T: fmt::Debug> fmt::Debug for SnapshotHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotHistory")
            .field("len", &self.snapshots.len())
            .field("cursor", &self.cursor)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> SnapshotHistory<T> {
    /// Create a history whose only snapshot is `initial`.
    #[must_use]
    pub fn new(initial: T, config: SnapshotConfig) -> Self {
        Self::from_arc(Arc::new(initial), config)
    }

    /// Create a history with no depth limit.
    #[must_use]
    pub fn unbounded(initial: T) -> Self {
        Self::new(initial, SnapshotConfig::unlimited())
    }

    /// Create a history from a pre-wrapped initial snapshot.
    #[must_use]
    pub fn from_arc(initial: Snapshot<T>, config: SnapshotConfig) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            config,
        }
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Append `state` after discarding every snapshot past the cursor, and
    /// move the cursor onto it.
    pub fn commit(&mut self, state: T) {
        self.commit_arc(Arc::new(state));
    }

    /// Append a pre-wrapped snapshot. See [`commit`](Self::commit).
    pub fn commit_arc(&mut self, state: Snapshot<T>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(state);
        self.cursor = self.snapshots.len() - 1;
        self.enforce_depth();
    }

    /// Step the cursor back one snapshot and return the snapshot now current.
    pub fn undo(&mut self) -> Result<Snapshot<T>, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NoUndoableState);
        }
        self.cursor -= 1;
        Ok(Arc::clone(&self.snapshots[self.cursor]))
    }

    /// Step the cursor forward one snapshot and return the snapshot now current.
    pub fn redo(&mut self) -> Result<Snapshot<T>, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NoRedoableState);
        }
        self.cursor += 1;
        Ok(Arc::clone(&self.snapshots[self.cursor]))
    }

    /// The snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> &Snapshot<T> {
        &self.snapshots[self.cursor]
    }

    // ====================================================================
    // Query
    // ====================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.snapshots.len() - 1 - self.cursor
    }

    /// Index of the current snapshot.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of retained snapshots (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; the history holds at least the initial state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Drop the oldest snapshot, shifting the cursor down by one.
    ///
    /// Refuses (returns `false`) when the cursor is already at the oldest
    /// snapshot, so the current state is never evicted.
    pub fn trim_oldest(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.snapshots.pop_front();
        self.cursor -= 1;
        true
    }

    fn enforce_depth(&mut self) {
        let limit = self.config.effective_depth();
        while self.snapshots.len() > limit && self.trim_oldest() {}
    }
}
