#![forbid(unsafe_code)]

//! Roster public facade crate.
//!
//! This crate provides the stable surface area for applications built on
//! roster's versioned collections. It re-exports the core and runtime types,
//! offers a prelude, and adds the pieces that sit outside the coordinator:
//!
//! - [`actions`]: reference command layer (add, edit, cascade delete, undo)
//! - [`persistence`]: the collaborator contract for loading and saving
//! - [`bootstrap`]: wiring a coordinator to a persistence collaborator
//! - `telemetry` (feature `telemetry`): subscriber installation

pub mod actions;
pub mod bootstrap;
pub mod error;
pub mod persistence;
#[cfg(feature = "telemetry")]
pub mod telemetry;

// --- Core re-exports -------------------------------------------------------

pub use roster_core::{Expense, Person, Record, RecruitmentPost, Schedule, StoreTag, TagSet};

// --- Runtime re-exports ----------------------------------------------------

pub use roster_runtime::{
    ActionReport, ActionScope, CommitEntry, ConfigError, Coordinator, CoordinatorConfig,
    CoordinatorError, FilteredView, LogConfig, Mutation, RosterConfig, VersionedStore,
};

// --- Errors ---------------------------------------------------------------

pub use error::{Error, Result};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::actions::{CommandResult, DuplicateCheck};
    pub use crate::persistence::{CollectionSink, CollectionSource, MemorySource};
    pub use crate::{
        Coordinator, CoordinatorConfig, CoordinatorError, Error, Expense, Mutation, Person,
        Record, RecruitmentPost, Result, RosterConfig, Schedule, StoreTag, TagSet,
        VersionedStore,
    };

    pub use crate::{core, runtime};
}

pub use roster_core as core;
pub use roster_runtime as runtime;
