#![forbid(unsafe_code)]

//! Cross-store undo/redo coordinator.
//!
//! The [`Coordinator`] owns a registry of versioned stores keyed by
//! [`StoreTag`] plus one [`CommitOrderLog`]. The command layer mutates stores
//! through it, then commits the set of stores one action touched; undo and
//! redo replay the log so that stores are stepped in exactly the reverse
//! (or original) order they were committed.
//!
//! # Commit
//!
//! ```text
//! commit({records, schedules})
//!   records.commit()      ─┐
//!   schedules.commit()    ─┼─ every named store snapshots
//!   log.record_commit()   ─┘  then one log entry is appended
//! ```
//!
//! # Undo / Redo
//!
//! `undo_last_action(n)` runs in two phases:
//!
//! 1. **Preflight**: look at the next `n` log entries without popping them,
//!    count how many steps each store must take, and compare against each
//!    store's own undo depth. Any shortfall fails the whole request before
//!    anything is touched.
//! 2. **Apply**: pop the entries and step every named store.
//!
//! A shortfall of log entries is the ordinary "nothing to undo" outcome. A
//! shortfall in a store's history means the log and that store disagree,
//! which is reported as [`CoordinatorError::HistoryDesynchronized`].
//!
//! # Invariants
//!
//! 1. For every registered store, the number of undo-side log entries naming
//!    it never exceeds its undo depth (likewise for redo).
//! 2. A failed undo/redo leaves the log and every store unchanged.
//! 3. The undo side of the log holds at most `config.max_undo_entries`
//!    entries; evicting an entry trims the oldest snapshot of each store it
//!    names.

use std::collections::BTreeMap;
use std::fmt;

use roster_core::{Record, StoreTag, TagSet};
use tracing::{debug, error, info, info_span, trace, warn};
use web_time::Instant;

use super::action::ActionScope;
use super::commit_log::{CommitEntry, CommitOrderLog};
use super::error::{CoordinatorError, Direction};
use super::versioned_store::{Mutation, VersionedHistory, VersionedStore};
use crate::reactive::{FilteredView, SortOrder};

/// Configuration for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CoordinatorConfig {
    /// Maximum number of undoable log entries. Unlimited by default; when
    /// capped, the oldest entries (and the matching store snapshots) are
    /// evicted past this limit.
    pub max_undo_entries: usize,
    /// Emit a warning when a commit leaves other stores with uncommitted
    /// changes.
    pub warn_on_pending: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_undo_entries: usize::MAX,
            warn_on_pending: true,
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn new(max_undo_entries: usize) -> Self {
        Self {
            max_undo_entries,
            ..Self::default()
        }
    }

    /// Create an unlimited configuration.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }
}

/// Outcome of a successful undo or redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub direction: Direction,
    /// Log entries consumed, in the order they were applied.
    pub entries: Vec<CommitEntry>,
    /// Steps taken per store.
    pub store_steps: BTreeMap<StoreTag, usize>,
}

impl ActionReport {
    fn empty(direction: Direction) -> Self {
        Self {
            direction,
            entries: Vec::new(),
            store_steps: BTreeMap::new(),
        }
    }

    /// Every store stepped by this action.
    #[must_use]
    pub fn touched(&self) -> TagSet {
        self.store_steps.keys().copied().collect()
    }

    /// Total store steps performed.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.store_steps.values().sum()
    }
}

/// Orchestrates commit, undo and redo across versioned stores.
pub struct Coordinator {
    stores: BTreeMap<StoreTag, Box<dyn VersionedHistory>>,
    log: CommitOrderLog,
    config: CoordinatorConfig,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("stores", &self.stores.keys().collect::<Vec<_>>())
            .field("undo_depth", &self.log.undo_depth())
            .field("redo_depth", &self.log.redo_depth())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl Coordinator {
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            stores: BTreeMap::new(),
            log: CommitOrderLog::new(),
            config,
        }
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register `store` under its own tag.
    pub fn register<T: Record>(&mut self, store: VersionedStore<T>) -> Result<(), CoordinatorError> {
        self.register_history(Box::new(store))
    }

    /// Register any [`VersionedHistory`] implementation under its own tag.
    ///
    /// Typed access through [`store`](Self::store) only works for
    /// [`VersionedStore`]s; other implementations are stepped and committed
    /// but not readable through the coordinator.
    pub fn register_history(
        &mut self,
        history: Box<dyn VersionedHistory>,
    ) -> Result<(), CoordinatorError> {
        let tag = history.tag();
        if self.stores.contains_key(&tag) {
            return Err(CoordinatorError::DuplicateStore(tag));
        }
        debug!(store = tag.as_str(), records = history.record_count(), "store registered");
        self.stores.insert(tag, history);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_store<T: Record>(mut self, store: VersionedStore<T>) -> Result<Self, CoordinatorError> {
        self.register(store)?;
        Ok(self)
    }

    /// Tags of every registered store.
    #[must_use]
    pub fn registered(&self) -> TagSet {
        self.stores.keys().copied().collect()
    }

    /// Typed read access to a store.
    pub fn store<T: Record>(&self, tag: StoreTag) -> Result<&VersionedStore<T>, CoordinatorError> {
        self.stores
            .get(&tag)
            .ok_or(CoordinatorError::UnknownStore(tag))?
            .as_any()
            .downcast_ref::<VersionedStore<T>>()
            .ok_or_else(|| CoordinatorError::type_mismatch::<T>(tag))
    }

    pub(crate) fn store_mut<T: Record>(
        &mut self,
        tag: StoreTag,
    ) -> Result<&mut VersionedStore<T>, CoordinatorError> {
        self.stores
            .get_mut(&tag)
            .ok_or(CoordinatorError::UnknownStore(tag))?
            .as_any_mut()
            .downcast_mut::<VersionedStore<T>>()
            .ok_or_else(|| CoordinatorError::type_mismatch::<T>(tag))
    }

    fn erased(&self, tag: StoreTag) -> Result<&dyn VersionedHistory, CoordinatorError> {
        self.stores
            .get(&tag)
            .map(|store| &**store)
            .ok_or(CoordinatorError::UnknownStore(tag))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Apply one domain mutation to the live collection of the store under
    /// `tag`. Nothing is committed.
    pub fn mutate<T: Record>(
        &mut self,
        tag: StoreTag,
        mutation: Mutation<T>,
    ) -> Result<(), CoordinatorError> {
        let kind = mutation.kind();
        self.store_mut::<T>(tag)?.apply(mutation)?;
        trace!(store = tag.as_str(), kind, "mutation applied");
        Ok(())
    }

    /// Open a scope that tracks which stores it mutates and commits exactly
    /// those as one action. Dropping the scope uncommitted rolls back.
    pub fn begin_action(&mut self) -> ActionScope<'_> {
        ActionScope::new(self)
    }

    /// Restore the live collection of every store in `tags` from its
    /// current snapshot.
    pub fn discard_uncommitted(&mut self, tags: TagSet) {
        for tag in tags.tags() {
            if let Some(store) = self.stores.get_mut(&tag) {
                store.discard_uncommitted();
            }
        }
    }

    /// Stores whose live collection differs from their current snapshot.
    #[must_use]
    pub fn pending(&self) -> TagSet {
        self.stores
            .iter()
            .filter(|(_, store)| store.has_uncommitted_changes())
            .map(|(tag, _)| *tag)
            .collect()
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Snapshot every store in `tags` and record one log entry opening a
    /// new action. An empty set is a no-op.
    pub fn commit(&mut self, tags: TagSet) -> Result<Option<CommitEntry>, CoordinatorError> {
        self.commit_entry(tags, false)
    }

    /// Like [`commit`](Self::commit), but the entry joins the action on top
    /// of the log, so it is undone and redone together with it by
    /// [`undo_action`](Self::undo_action) / [`redo_action`](Self::redo_action).
    pub fn commit_chained(
        &mut self,
        tags: TagSet,
    ) -> Result<Option<CommitEntry>, CoordinatorError> {
        self.commit_entry(tags, true)
    }

    fn commit_entry(
        &mut self,
        tags: TagSet,
        chained: bool,
    ) -> Result<Option<CommitEntry>, CoordinatorError> {
        if tags.is_empty() {
            debug!("empty commit ignored");
            return Ok(None);
        }
        for tag in tags.tags() {
            self.erased(tag)?;
        }

        let _span = info_span!("roster.commit", tags = %tags, chained).entered();
        for tag in tags.tags() {
            if let Some(store) = self.stores.get_mut(&tag) {
                store.commit();
            }
        }
        let entry = if chained {
            self.log.record_chained(tags)
        } else {
            self.log.record_commit(tags)
        };
        self.enforce_depth();

        if self.config.warn_on_pending {
            let pending = self.pending();
            if !pending.is_empty() {
                warn!(pending = %pending, "commit left stores with uncommitted changes");
            }
        }
        info!(
            seq = entry.seq,
            action = entry.action.0,
            tags = %tags,
            undo_depth = self.log.undo_depth(),
            "action committed"
        );
        Ok(Some(entry))
    }

    fn enforce_depth(&mut self) {
        while self.log.undo_depth() > self.config.max_undo_entries {
            let Some(evicted) = self.log.evict_oldest() else {
                break;
            };
            for tag in evicted.tags.tags() {
                let trimmed = self
                    .stores
                    .get_mut(&tag)
                    .is_some_and(|store| store.trim_oldest());
                if !trimmed {
                    error!(
                        store = tag.as_str(),
                        seq = evicted.seq,
                        "evicted log entry had no matching store snapshot"
                    );
                }
            }
            trace!(seq = evicted.seq, tags = %evicted.tags, "log entry evicted");
        }
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Undo the last `step_count` log entries as one user-visible action.
    pub fn undo_last_action(&mut self, step_count: usize) -> Result<ActionReport, CoordinatorError> {
        self.step(Direction::Undo, step_count)
    }

    /// Redo the next `step_count` log entries as one user-visible action.
    pub fn redo_last_action(&mut self, step_count: usize) -> Result<ActionReport, CoordinatorError> {
        self.step(Direction::Redo, step_count)
    }

    /// Undo every entry of the most recent action.
    pub fn undo_action(&mut self) -> Result<ActionReport, CoordinatorError> {
        match self.log.steps_for_last_action() {
            0 => {
                warn!(direction = "undo", "nothing to undo");
                Err(CoordinatorError::NoUndoableState)
            }
            steps => self.undo_last_action(steps),
        }
    }

    /// Redo every entry of the most recently undone action.
    pub fn redo_action(&mut self) -> Result<ActionReport, CoordinatorError> {
        match self.log.steps_for_next_redo() {
            0 => {
                warn!(direction = "redo", "nothing to redo");
                Err(CoordinatorError::NoRedoableState)
            }
            steps => self.redo_last_action(steps),
        }
    }

    fn step(&mut self, direction: Direction, steps: usize) -> Result<ActionReport, CoordinatorError> {
        if steps == 0 {
            return Ok(ActionReport::empty(direction));
        }
        let span = match direction {
            Direction::Undo => info_span!(
                "roster.undo",
                steps,
                stores_stepped = tracing::field::Empty,
                duration_us = tracing::field::Empty
            ),
            Direction::Redo => info_span!(
                "roster.redo",
                steps,
                stores_stepped = tracing::field::Empty,
                duration_us = tracing::field::Empty
            ),
        };
        let _guard = span.enter();
        let start = Instant::now();

        let store_steps = self.preflight(direction, steps)?;
        let entries = self.apply(direction, steps)?;

        let report = ActionReport {
            direction,
            entries,
            store_steps,
        };
        span.record("stores_stepped", report.total_steps() as u64);
        span.record("duration_us", start.elapsed().as_micros() as u64);
        info!(
            direction = direction.as_str(),
            entries = report.entries.len(),
            touched = %report.touched(),
            "history stepped"
        );
        Ok(report)
    }

    /// Count per-store steps for the next `steps` entries and verify every
    /// store can take them. Mutates nothing.
    fn preflight(
        &self,
        direction: Direction,
        steps: usize,
    ) -> Result<BTreeMap<StoreTag, usize>, CoordinatorError> {
        let entries: Vec<CommitEntry> = match direction {
            Direction::Undo => self.log.peek_undo(steps).copied().collect(),
            Direction::Redo => self.log.peek_redo(steps).copied().collect(),
        };
        if entries.len() < steps {
            warn!(
                direction = direction.as_str(),
                requested = steps,
                available = entries.len(),
                "not enough history"
            );
            return Err(CoordinatorError::nothing_to(direction));
        }

        let mut needed: BTreeMap<StoreTag, usize> = BTreeMap::new();
        for entry in &entries {
            for tag in entry.tags.tags() {
                *needed.entry(tag).or_default() += 1;
            }
        }

        for (&tag, &count) in &needed {
            let available = match self.stores.get(&tag) {
                Some(store) => match direction {
                    Direction::Undo => store.undo_depth(),
                    Direction::Redo => store.redo_depth(),
                },
                None => 0,
            };
            if available < count {
                error!(
                    store = tag.as_str(),
                    direction = direction.as_str(),
                    needed = count,
                    available,
                    "commit order log and store history are out of step"
                );
                return Err(CoordinatorError::HistoryDesynchronized {
                    tag,
                    direction,
                    needed: count,
                    available,
                });
            }
        }
        Ok(needed)
    }

    fn apply(
        &mut self,
        direction: Direction,
        steps: usize,
    ) -> Result<Vec<CommitEntry>, CoordinatorError> {
        let mut applied = Vec::with_capacity(steps);
        for _ in 0..steps {
            let entry = match direction {
                Direction::Undo => self.log.pop_for_undo(),
                Direction::Redo => self.log.pop_for_redo(),
            }
            .map_err(|_| CoordinatorError::nothing_to(direction))?;

            for tag in entry.tags.tags() {
                let store = self.stores.get_mut(&tag).ok_or(
                    CoordinatorError::HistoryDesynchronized {
                        tag,
                        direction,
                        needed: 1,
                        available: 0,
                    },
                )?;
                let stepped = match direction {
                    Direction::Undo => store.undo_one_step(),
                    Direction::Redo => store.redo_one_step(),
                };
                stepped.map_err(|_| CoordinatorError::HistoryDesynchronized {
                    tag,
                    direction,
                    needed: 1,
                    available: 0,
                })?;
            }
            debug!(
                direction = direction.as_str(),
                seq = entry.seq,
                tags = %entry.tags,
                "log entry applied"
            );
            applied.push(entry);
        }
        Ok(applied)
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Whether the log has an entry to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    /// Whether the log has an entry to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    #[must_use]
    pub fn undoable_entries(&self) -> usize {
        self.log.undo_depth()
    }

    #[must_use]
    pub fn redoable_entries(&self) -> usize {
        self.log.redo_depth()
    }

    /// Log entries making up the most recent action.
    #[must_use]
    pub fn steps_for_last_action(&self) -> usize {
        self.log.steps_for_last_action()
    }

    /// Log entries making up the most recently undone action.
    #[must_use]
    pub fn steps_for_next_redo(&self) -> usize {
        self.log.steps_for_next_redo()
    }

    #[must_use]
    pub fn log(&self) -> &CommitOrderLog {
        &self.log
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Number of live records in the store under `tag`.
    pub fn record_count(&self, tag: StoreTag) -> Result<usize, CoordinatorError> {
        Ok(self.erased(tag)?.record_count())
    }

    /// Owned copy of a store's live collection, for persistence.
    pub fn full_snapshot<T: Record>(&self, tag: StoreTag) -> Result<Vec<T>, CoordinatorError> {
        Ok(self.store::<T>(tag)?.full_snapshot())
    }

    // ========================================================================
    // Filtered views
    // ========================================================================

    /// Install `predicate` (and optional ordering) on a store's view and
    /// return the recomputed view.
    pub fn filtered_view<T: Record>(
        &mut self,
        tag: StoreTag,
        predicate: impl Fn(&T) -> bool + 'static,
        sort: Option<SortOrder<T>>,
    ) -> Result<&FilteredView<T>, CoordinatorError> {
        let store = self.store_mut::<T>(tag)?;
        store.set_filter(Box::new(predicate), sort);
        Ok(store.view())
    }

    /// A store's view under its current predicate.
    pub fn view<T: Record>(&self, tag: StoreTag) -> Result<&FilteredView<T>, CoordinatorError> {
        Ok(self.store::<T>(tag)?.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Expense, Person, Schedule};

    fn coordinator() -> Coordinator {
        let mut coordinator = Coordinator::new(CoordinatorConfig::unlimited());
        coordinator
            .register(VersionedStore::<Person>::empty(StoreTag::Records))
            .unwrap();
        coordinator
            .register(VersionedStore::<Schedule>::empty(StoreTag::Schedules))
            .unwrap();
        coordinator
            .register(VersionedStore::<Expense>::empty(StoreTag::Expenses))
            .unwrap();
        coordinator
    }

    fn person(name: &str) -> Person {
        Person::new(name)
    }

    fn expense(owner: &str, amount: i64) -> Expense {
        Expense::new(owner, amount, "2024-01-01", "Lunch")
    }

    fn people(c: &Coordinator) -> Vec<Person> {
        c.full_snapshot::<Person>(StoreTag::Records).unwrap()
    }

    fn expenses(c: &Coordinator) -> Vec<Expense> {
        c.full_snapshot::<Expense>(StoreTag::Expenses).unwrap()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut c = coordinator();
        let err = c
            .register(VersionedStore::<Person>::empty(StoreTag::Records))
            .unwrap_err();
        assert_eq!(err, CoordinatorError::DuplicateStore(StoreTag::Records));
    }

    #[test]
    fn typed_access_checks_record_type() {
        let c = coordinator();
        assert!(c.store::<Person>(StoreTag::Records).is_ok());
        assert!(matches!(
            c.store::<Expense>(StoreTag::Records),
            Err(CoordinatorError::StoreTypeMismatch { .. })
        ));
        assert_eq!(
            c.store::<Person>(StoreTag::RecruitmentPosts).unwrap_err(),
            CoordinatorError::UnknownStore(StoreTag::RecruitmentPosts)
        );
    }

    #[test]
    fn single_store_scenario() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();
        assert!(c.can_undo());
        assert!(!c.can_redo());

        c.undo_last_action(1).unwrap();
        assert!(people(&c).is_empty());
        assert!(!c.can_undo());
        assert!(c.can_redo());

        c.redo_last_action(1).unwrap();
        assert_eq!(people(&c), vec![person("R1")]);
        assert!(c.can_undo());
        assert!(!c.can_redo());
    }

    #[test]
    fn undo_follows_cross_store_commit_order() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();
        c.mutate(StoreTag::Expenses, Mutation::Add(expense("R1", 500)))
            .unwrap();
        c.commit(TagSet::EXPENSES).unwrap();

        let first = c.undo_last_action(1).unwrap();
        assert_eq!(first.touched(), TagSet::EXPENSES);
        assert!(expenses(&c).is_empty());
        assert_eq!(people(&c), vec![person("R1")]);

        let second = c.undo_last_action(1).unwrap();
        assert_eq!(second.touched(), TagSet::RECORDS);
        assert!(people(&c).is_empty());
    }

    #[test]
    fn grouped_commit_undoes_all_stores_in_one_step() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.mutate(StoreTag::Expenses, Mutation::Add(expense("R1", 10)))
            .unwrap();
        c.commit(TagSet::RECORDS | TagSet::EXPENSES).unwrap();
        assert_eq!(c.undoable_entries(), 1);

        let report = c.undo_last_action(1).unwrap();
        assert_eq!(report.total_steps(), 2);
        assert!(people(&c).is_empty());
        assert!(expenses(&c).is_empty());
    }

    #[test]
    fn empty_commit_is_noop() {
        let mut c = coordinator();
        assert_eq!(c.commit(TagSet::empty()).unwrap(), None);
        assert!(!c.can_undo());
    }

    #[test]
    fn commit_to_unknown_store_commits_nothing() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        let err = c
            .commit(TagSet::RECORDS | TagSet::RECRUITMENT_POSTS)
            .unwrap_err();
        assert_eq!(
            err,
            CoordinatorError::UnknownStore(StoreTag::RecruitmentPosts)
        );
        assert!(!c.can_undo());
        assert!(!c.store::<Person>(StoreTag::Records).unwrap().can_undo());
    }

    #[test]
    fn undo_past_history_mutates_nothing() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();

        assert_eq!(
            c.undo_last_action(2).unwrap_err(),
            CoordinatorError::NoUndoableState
        );
        assert_eq!(people(&c), vec![person("R1")]);
        assert_eq!(c.undoable_entries(), 1);
    }

    #[test]
    fn redo_on_fresh_coordinator_fails() {
        let mut c = coordinator();
        assert_eq!(
            c.redo_last_action(1).unwrap_err(),
            CoordinatorError::NoRedoableState
        );
        assert_eq!(c.redo_action().unwrap_err(), CoordinatorError::NoRedoableState);
        assert_eq!(c.undo_action().unwrap_err(), CoordinatorError::NoUndoableState);
    }

    #[test]
    fn zero_steps_is_noop() {
        let mut c = coordinator();
        let report = c.undo_last_action(0).unwrap();
        assert!(report.entries.is_empty());
        assert_eq!(report.total_steps(), 0);
    }

    #[test]
    fn commit_after_undo_discards_redo() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();
        c.undo_last_action(1).unwrap();
        c.mutate(StoreTag::Records, Mutation::Add(person("R2"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();

        assert_eq!(
            c.redo_last_action(1).unwrap_err(),
            CoordinatorError::NoRedoableState
        );
        assert_eq!(people(&c), vec![person("R2")]);
    }

    #[test]
    fn chained_commits_undo_as_one_action() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();

        c.mutate(StoreTag::Records, Mutation::Delete(person("R1")))
            .unwrap();
        c.commit(TagSet::RECORDS).unwrap();
        c.commit_chained(TagSet::SCHEDULES).unwrap();
        c.commit_chained(TagSet::EXPENSES).unwrap();
        assert_eq!(c.steps_for_last_action(), 3);

        let report = c.undo_action().unwrap();
        assert_eq!(report.entries.len(), 3);
        assert_eq!(people(&c), vec![person("R1")]);
        assert_eq!(c.steps_for_last_action(), 1);
        assert_eq!(c.steps_for_next_redo(), 3);

        c.redo_action().unwrap();
        assert!(people(&c).is_empty());
    }

    #[test]
    fn depth_limit_evicts_log_and_store_snapshots_together() {
        let mut c = Coordinator::new(CoordinatorConfig::new(2));
        c.register(VersionedStore::<Person>::empty(StoreTag::Records))
            .unwrap();
        for name in ["A", "B", "C"] {
            c.mutate(StoreTag::Records, Mutation::Add(person(name))).unwrap();
            c.commit(TagSet::RECORDS).unwrap();
        }
        assert_eq!(c.undoable_entries(), 2);
        let store = c.store::<Person>(StoreTag::Records).unwrap();
        assert_eq!(store.undo_depth(), 2);

        c.undo_last_action(2).unwrap();
        assert_eq!(people(&c), vec![person("A")]);
        assert!(!c.can_undo());
    }

    #[test]
    fn filtered_view_follows_undo() {
        let mut c = coordinator();
        let view = c
            .filtered_view::<Person>(StoreTag::Records, |p| p.name.starts_with('A'), None)
            .unwrap();
        assert!(view.is_empty());

        c.mutate(StoreTag::Records, Mutation::Add(person("Ann"))).unwrap();
        c.mutate(StoreTag::Records, Mutation::Add(person("Ben"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();
        assert_eq!(c.view::<Person>(StoreTag::Records).unwrap().len(), 1);

        c.undo_last_action(1).unwrap();
        assert!(c.view::<Person>(StoreTag::Records).unwrap().is_empty());
    }

    #[test]
    fn pending_reports_uncommitted_stores() {
        let mut c = coordinator();
        c.mutate(StoreTag::Expenses, Mutation::Add(expense("X", 1)))
            .unwrap();
        assert_eq!(c.pending(), TagSet::EXPENSES);
        c.discard_uncommitted(TagSet::EXPENSES);
        assert!(c.pending().is_empty());
        assert!(expenses(&c).is_empty());
    }

    #[test]
    fn can_undo_is_pure() {
        let mut c = coordinator();
        c.mutate(StoreTag::Records, Mutation::Add(person("R1"))).unwrap();
        c.commit(TagSet::RECORDS).unwrap();
        for _ in 0..3 {
            assert!(c.can_undo());
            assert!(!c.can_redo());
        }
        assert_eq!(c.undoable_entries(), 1);
    }
}
