#![forbid(unsafe_code)]

//! Cross-store undo/redo.
//!
//! Every domain collection lives in its own [`VersionedStore`], which keeps
//! a full-state [`SnapshotHistory`] of that collection. A single
//! [`Coordinator`] owns all stores plus one [`CommitOrderLog`] recording
//! which stores each commit froze, so one undo can step several independent
//! histories back in exactly the order they moved forward.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Coordinator                           │
//! │                                                                │
//! │   CommitOrderLog    #1 {records}  #2 {expenses}  #3 {records, │
//! │                                                   schedules}  │
//! │                                                                │
//! │   ┌─────────────┐  ┌─────────────┐  ┌─────────────┐           │
//! │   │ records     │  │ schedules   │  │ expenses    │   ...     │
//! │   │ live ──┐    │  │ live ──┐    │  │ live ──┐    │           │
//! │   │ [s0 s1 s2 s3]│ │ [s0 s1]     │  │ [s0 s1]     │           │
//! │   └─────────────┘  └─────────────┘  └─────────────┘           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use roster_runtime::undo::{Coordinator, Mutation, VersionedStore};
//! use roster_core::{Person, StoreTag, TagSet};
//!
//! let mut coordinator = Coordinator::default();
//! coordinator.register(VersionedStore::<Person>::empty(StoreTag::Records))?;
//!
//! coordinator.mutate(StoreTag::Records, Mutation::Add(Person::new("Ann")))?;
//! coordinator.commit(TagSet::RECORDS)?;
//!
//! coordinator.undo_last_action(1)?;
//! ```
//!
//! # Module Structure
//!
//! - [`snapshot_history`]: linear snapshot sequence with a cursor
//! - [`versioned_store`]: live collection plus its history
//! - [`commit_log`]: ordered record of committed store sets
//! - [`coordinator`]: registry, commit and atomic multi-store undo/redo
//! - [`action`]: RAII grouping of mutations into one commit
//! - [`error`]: error types

pub mod action;
pub mod commit_log;
pub mod coordinator;
pub mod error;
pub mod snapshot_history;
pub mod versioned_store;

pub use action::ActionScope;
pub use commit_log::{ActionId, CommitEntry, CommitOrderLog};
pub use coordinator::{ActionReport, Coordinator, CoordinatorConfig};
pub use error::{CoordinatorError, Direction, HistoryError, StoreError};
pub use snapshot_history::{Snapshot, SnapshotConfig, SnapshotHistory};
pub use versioned_store::{Mutation, VersionedHistory, VersionedStore};
