#![forbid(unsafe_code)]

//! Error types for the undo/redo machinery.
//!
//! "Nothing to undo" and "nothing to redo" are expected outcomes and are
//! reported as ordinary values. [`CoordinatorError::HistoryDesynchronized`]
//! is the only variant that indicates a defect.

use std::any::type_name;
use std::fmt;

use roster_core::StoreTag;

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Undo,
    Redo,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Undo => "undo",
            Direction::Redo => "redo",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single history (snapshot history or commit order log).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// The pointer is at the oldest retained state.
    NoUndoableState,
    /// The pointer is at the newest state.
    NoRedoableState,
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUndoableState => write!(f, "no undoable state"),
            Self::NoRedoableState => write!(f, "no redoable state"),
        }
    }
}

impl std::error::Error for HistoryError {}

/// Failure of a domain mutation on a store's live collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record targeted by an update or delete is not in the collection.
    RecordNotFound { tag: StoreTag },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordNotFound { tag } => write!(f, "record not found in {tag}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors surfaced by the [`Coordinator`](super::Coordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The commit order log has nothing left to undo.
    NoUndoableState,
    /// The commit order log has nothing left to redo.
    NoRedoableState,
    /// A log entry names a store whose own history cannot step in
    /// lock-step with the log.
    HistoryDesynchronized {
        tag: StoreTag,
        direction: Direction,
        needed: usize,
        available: usize,
    },
    /// No store is registered under the tag.
    UnknownStore(StoreTag),
    /// A store is already registered under the tag.
    DuplicateStore(StoreTag),
    /// The store under the tag holds a different record type.
    StoreTypeMismatch {
        tag: StoreTag,
        expected: &'static str,
    },
    /// A domain mutation failed.
    Store(StoreError),
}

impl CoordinatorError {
    pub(crate) fn type_mismatch<T>(tag: StoreTag) -> Self {
        Self::StoreTypeMismatch {
            tag,
            expected: type_name::<T>(),
        }
    }

    pub(crate) fn nothing_to(direction: Direction) -> Self {
        match direction {
            Direction::Undo => Self::NoUndoableState,
            Direction::Redo => Self::NoRedoableState,
        }
    }

    /// Whether this is an expected outcome the user can be told about
    /// ("nothing to undo").
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoUndoableState | Self::NoRedoableState | Self::Store(_)
        )
    }

    /// Whether this indicates an internal-consistency fault.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::HistoryDesynchronized { .. })
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUndoableState => write!(f, "nothing to undo"),
            Self::NoRedoableState => write!(f, "nothing to redo"),
            Self::HistoryDesynchronized {
                tag,
                direction,
                needed,
                available,
            } => write!(
                f,
                "history desynchronized: {direction} needs {needed} step(s) on {tag} but only {available} available"
            ),
            Self::UnknownStore(tag) => write!(f, "no store registered for {tag}"),
            Self::DuplicateStore(tag) => write!(f, "store already registered for {tag}"),
            Self::StoreTypeMismatch { tag, expected } => {
                write!(f, "store {tag} does not hold {expected}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CoordinatorError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
