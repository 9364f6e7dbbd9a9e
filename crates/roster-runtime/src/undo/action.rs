#![forbid(unsafe_code)]

//! RAII grouping of mutations into one committed action.
//!
//! An [`ActionScope`] borrows the coordinator mutably, records which stores
//! it mutates, and commits exactly that set on [`commit`](ActionScope::commit).
//! A scope dropped without committing (early return, `?`, panic unwind)
//! puts every store it touched back to the live state it had when the
//! scope first mutated it. Uncommitted edits made before the scope opened
//! survive a rollback.
//!
//! ```ignore
//! let mut action = coordinator.begin_action();
//! action.mutate(StoreTag::Records, Mutation::Delete(person))?;
//! action.mutate(StoreTag::Schedules, Mutation::ResetAll(kept))?;
//! action.commit()?; // one log entry naming {records, schedules}
//! ```

use roster_core::{Record, StoreTag, TagSet};
use tracing::debug;

use super::commit_log::CommitEntry;
use super::coordinator::Coordinator;
use super::error::CoordinatorError;
use super::versioned_store::{Mutation, VersionedStore};

/// Puts one store back to its live state from before the scope touched it.
type Restore = Box<dyn FnOnce(&mut Coordinator)>;

/// A pending grouped action. See the [module docs](self).
#[must_use = "dropping an ActionScope rolls back its mutations"]
pub struct ActionScope<'a> {
    coordinator: &'a mut Coordinator,
    touched: TagSet,
    restores: Vec<Restore>,
    finished: bool,
}

impl<'a> ActionScope<'a> {
    pub(crate) fn new(coordinator: &'a mut Coordinator) -> Self {
        Self {
            coordinator,
            touched: TagSet::empty(),
            restores: Vec::new(),
            finished: false,
        }
    }

    /// Apply `mutation` and include `tag` in this action's commit.
    ///
    /// A failed mutation leaves the store unchanged and is not recorded.
    pub fn mutate<T: Record>(
        &mut self,
        tag: StoreTag,
        mutation: Mutation<T>,
    ) -> Result<(), CoordinatorError> {
        let checkpoint = if self.touched.has(tag) {
            None
        } else {
            Some(self.coordinator.store::<T>(tag)?.checkpoint())
        };
        self.coordinator.mutate(tag, mutation)?;
        if let Some((live, dirty)) = checkpoint {
            self.restores.push(Box::new(move |coordinator: &mut Coordinator| {
                if let Ok(store) = coordinator.store_mut::<T>(tag) {
                    store.restore(live, dirty);
                }
            }));
            self.touched.add(tag);
        }
        Ok(())
    }

    /// Read access to a store while the action is open.
    pub fn store<T: Record>(&self, tag: StoreTag) -> Result<&VersionedStore<T>, CoordinatorError> {
        self.coordinator.store(tag)
    }

    /// Stores mutated so far.
    #[must_use]
    pub fn touched(&self) -> TagSet {
        self.touched
    }

    /// Commit every touched store as one log entry.
    ///
    /// A scope that touched nothing commits nothing and returns `None`.
    pub fn commit(mut self) -> Result<Option<CommitEntry>, CoordinatorError> {
        self.finished = true;
        let result = self.coordinator.commit(self.touched);
        if result.is_err() {
            self.restore();
        }
        result
    }

    /// Put every touched store back to its state before this scope.
    pub fn rollback(mut self) {
        self.finished = true;
        self.restore();
    }

    fn restore(&mut self) {
        if self.touched.is_empty() {
            return;
        }
        for restore in std::mem::take(&mut self.restores) {
            restore(&mut *self.coordinator);
        }
        debug!(touched = %self.touched, "action rolled back");
    }
}

impl Drop for ActionScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.restore();
        }
    }
}
