#![forbid(unsafe_code)]

//! Roster Runtime
//!
//! Versioning machinery for the roster collections: per-collection snapshot
//! histories, the cross-store commit order log, and the coordinator that
//! drives atomic multi-store undo and redo.
//!
//! # Key Components
//!
//! - [`SnapshotHistory`] - Linear sequence of immutable snapshots with a cursor
//! - [`VersionedStore`] - Live collection plus its snapshot history
//! - [`CommitOrderLog`] - Which stores each commit froze, in order
//! - [`Coordinator`] - Registry, commit, and preflighted undo/redo
//! - [`ActionScope`] - RAII grouping of mutations into one commit
//! - [`FilteredView`] - Predicate view recomputed on every live change
//! - [`RosterConfig`] - Configuration loadable from TOML/JSON
//!
//! # How it fits in the system
//! `roster-core` defines the records and tags; this crate versions them.
//! The `roster` facade layers the command functions, persistence contract
//! and subscriber setup on top.

pub mod config;
pub mod reactive;
pub mod undo;

pub use config::{ConfigError, LogConfig, RosterConfig};
pub use reactive::{FilteredView, Predicate, SortOrder};
pub use undo::{
    ActionId, ActionReport, ActionScope, CommitEntry, CommitOrderLog, Coordinator,
    CoordinatorConfig, CoordinatorError, Direction, HistoryError, Mutation, Snapshot,
    SnapshotConfig, SnapshotHistory, StoreError, VersionedHistory, VersionedStore,
};
