#![forbid(unsafe_code)]

//! A live record collection paired with its snapshot history.
//!
//! [`VersionedStore<T>`] is the unit the coordinator versions. Domain
//! mutations edit the live collection in place and never commit on their
//! own; [`commit`](VersionedStore::commit) freezes the live collection into
//! a new snapshot, and undo/redo overwrite the live collection with the
//! snapshot the history now points at.
//!
//! The live collection is an [`im::Vector`], so a commit clones in O(1) and
//! consecutive snapshots share structure.
//!
//! # Invariants
//!
//! 1. When `dirty` is false, `live` equals the snapshot at the history cursor.
//! 2. `version` increments on every change to `live`.
//! 3. The attached [`FilteredView`] is refreshed after every change to `live`.

use std::any::Any;
use std::fmt;

use im::Vector;
use roster_core::{Record, StoreTag};
use tracing::debug;

use super::error::{HistoryError, StoreError};
use super::snapshot_history::{Snapshot, SnapshotHistory};
use crate::reactive::{FilteredView, Predicate, SortOrder};

/// One domain mutation against a store's live collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// Append a record.
    Add(T),
    /// Replace the first record equal to `target` with `replacement`.
    Update { target: T, replacement: T },
    /// Remove the first record equal to the given one.
    Delete(T),
    /// Replace the whole collection.
    ResetAll(Vec<T>),
}

impl<T> Mutation<T> {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Mutation::Add(_) => "add",
            Mutation::Update { .. } => "update",
            Mutation::Delete(_) => "delete",
            Mutation::ResetAll(_) => "reset_all",
        }
    }
}

/// Type-erased view of a [`VersionedStore`], as held by the coordinator.
///
/// Only the history-stepping surface is exposed; record access goes through
/// [`as_any`](VersionedHistory::as_any) and a downcast to the concrete store.
pub trait VersionedHistory: Any {
    fn tag(&self) -> StoreTag;
    fn commit(&mut self);
    fn undo_one_step(&mut self) -> Result<(), HistoryError>;
    fn redo_one_step(&mut self) -> Result<(), HistoryError>;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
    fn undo_depth(&self) -> usize;
    fn redo_depth(&self) -> usize;
    fn trim_oldest(&mut self) -> bool;
    fn has_uncommitted_changes(&self) -> bool;
    fn discard_uncommitted(&mut self);
    fn record_count(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A versioned domain collection.
pub struct VersionedStore<T: Record> {
    tag: StoreTag,
    live: Vector<T>,
    history: SnapshotHistory<Vector<T>>,
    dirty: bool,
    version: u64,
    view: FilteredView<T>,
}

impl<T: Record> fmt::Debug for VersionedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedStore")
            .field("tag", &self.tag)
            .field("len", &self.live.len())
            .field("dirty", &self.dirty)
            .field("version", &self.version)
            .field("history", &self.history)
            .finish()
    }
}

impl<T: Record> VersionedStore<T> {
    /// Create a store whose initial snapshot holds `initial`.
    ///
    /// The history is unbounded; depth limits are applied by the
    /// coordinator so that every store trims in lock-step with the log.
    #[must_use]
    pub fn new(tag: StoreTag, initial: impl IntoIterator<Item = T>) -> Self {
        let live: Vector<T> = initial.into_iter().collect();
        let history = SnapshotHistory::unbounded(live.clone());
        let mut store = Self {
            tag,
            live,
            history,
            dirty: false,
            version: 0,
            view: FilteredView::show_all(),
        };
        store.view.refresh(&store.live, 0);
        store
    }

    /// Create an empty store.
    #[must_use]
    pub fn empty(tag: StoreTag) -> Self {
        Self::new(tag, std::iter::empty())
    }

    #[must_use]
    pub fn tag(&self) -> StoreTag {
        self.tag
    }

    // ====================================================================
    // Domain mutations (live collection only)
    // ====================================================================

    /// Append `record` to the live collection.
    pub fn add(&mut self, record: T) {
        self.live.push_back(record);
        self.touch();
    }

    /// Replace the first record equal to `target` with `replacement`.
    pub fn update_one(&mut self, target: &T, replacement: T) -> Result<(), StoreError> {
        let index = self.index_of(target)?;
        self.live.set(index, replacement);
        self.touch();
        Ok(())
    }

    /// Remove and return the first record equal to `target`.
    pub fn delete_one(&mut self, target: &T) -> Result<T, StoreError> {
        let index = self.index_of(target)?;
        let removed = self.live.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Replace the whole live collection.
    pub fn reset_all(&mut self, records: impl IntoIterator<Item = T>) {
        self.live = records.into_iter().collect();
        self.touch();
    }

    /// Apply one [`Mutation`].
    pub fn apply(&mut self, mutation: Mutation<T>) -> Result<(), StoreError> {
        match mutation {
            Mutation::Add(record) => self.add(record),
            Mutation::Update {
                target,
                replacement,
            } => self.update_one(&target, replacement)?,
            Mutation::Delete(record) => {
                self.delete_one(&record)?;
            }
            Mutation::ResetAll(records) => self.reset_all(records),
        }
        Ok(())
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Freeze the live collection into a new snapshot.
    pub fn commit(&mut self) {
        self.history.commit(self.live.clone());
        self.dirty = false;
        debug!(
            store = self.tag.as_str(),
            position = self.history.position(),
            len = self.live.len(),
            "store committed"
        );
    }

    /// Step the history back and load the snapshot into the live collection.
    ///
    /// Uncommitted live changes are overwritten.
    pub fn undo_one_step(&mut self) -> Result<(), HistoryError> {
        let snapshot = self.history.undo()?;
        self.load(&snapshot);
        debug!(
            store = self.tag.as_str(),
            position = self.history.position(),
            "store stepped back"
        );
        Ok(())
    }

    /// Step the history forward and load the snapshot into the live collection.
    pub fn redo_one_step(&mut self) -> Result<(), HistoryError> {
        let snapshot = self.history.redo()?;
        self.load(&snapshot);
        debug!(
            store = self.tag.as_str(),
            position = self.history.position(),
            "store stepped forward"
        );
        Ok(())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// The snapshot at the history cursor.
    #[must_use]
    pub fn committed(&self) -> &Snapshot<Vector<T>> {
        self.history.current()
    }

    #[must_use]
    pub fn history(&self) -> &SnapshotHistory<Vector<T>> {
        &self.history
    }

    /// Whether the live collection has changed since the last commit,
    /// undo or redo.
    #[must_use]
    pub fn has_uncommitted_changes(&self) -> bool {
        self.dirty
    }

    /// Restore the live collection from the current snapshot.
    pub fn discard_uncommitted(&mut self) {
        if !self.dirty {
            return;
        }
        let snapshot = std::sync::Arc::clone(self.history.current());
        self.load(&snapshot);
        debug!(store = self.tag.as_str(), "uncommitted changes discarded");
    }

    // ====================================================================
    // Read access
    // ====================================================================

    /// The live collection.
    #[must_use]
    pub fn items(&self) -> &Vector<T> {
        &self.live
    }

    pub fn iter(&self) -> im::vector::Iter<'_, T> {
        self.live.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether a record equal to `record` is present.
    #[must_use]
    pub fn contains(&self, record: &T) -> bool {
        self.live.iter().any(|r| r == record)
    }

    /// Whether a record denoting the same entity as `record` is present.
    #[must_use]
    pub fn contains_same(&self, record: &T) -> bool {
        self.live.iter().any(|r| r.is_same(record))
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.live.iter().find(|r| predicate(*r))
    }

    /// Owned copy of the live collection, for persistence collaborators.
    #[must_use]
    pub fn full_snapshot(&self) -> Vec<T> {
        self.live.iter().cloned().collect()
    }

    /// Monotonic change counter of the live collection.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    // ====================================================================
    // Filtered view
    // ====================================================================

    /// Install a predicate and optional ordering on the view and recompute it.
    pub fn set_filter(&mut self, predicate: Predicate<T>, sort: Option<SortOrder<T>>) {
        self.view.set_predicate(predicate, sort);
        self.view.refresh(&self.live, self.version);
    }

    /// The filtered view over the live collection.
    #[must_use]
    pub fn view(&self) -> &FilteredView<T> {
        &self.view
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn index_of(&self, target: &T) -> Result<usize, StoreError> {
        self.live
            .iter()
            .position(|r| r == target)
            .ok_or(StoreError::RecordNotFound { tag: self.tag })
    }

    /// Live collection and dirty flag, for [`restore`](Self::restore).
    pub(crate) fn checkpoint(&self) -> (Vector<T>, bool) {
        (self.live.clone(), self.dirty)
    }

    pub(crate) fn restore(&mut self, live: Vector<T>, dirty: bool) {
        self.live = live;
        self.bump();
        self.dirty = dirty;
    }

    fn load(&mut self, snapshot: &Snapshot<Vector<T>>) {
        self.live = Vector::clone(snapshot);
        self.bump();
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.bump();
        self.dirty = true;
    }

    fn bump(&mut self) {
        self.version += 1;
        self.view.refresh(&self.live, self.version);
    }
}

impl<T: Record> VersionedHistory for VersionedStore<T> {
    fn tag(&self) -> StoreTag {
        self.tag
    }

    fn commit(&mut self) {
        VersionedStore::commit(self);
    }

    fn undo_one_step(&mut self) -> Result<(), HistoryError> {
        VersionedStore::undo_one_step(self)
    }

    fn redo_one_step(&mut self) -> Result<(), HistoryError> {
        VersionedStore::redo_one_step(self)
    }

    fn can_undo(&self) -> bool {
        VersionedStore::can_undo(self)
    }

    fn can_redo(&self) -> bool {
        VersionedStore::can_redo(self)
    }

    fn undo_depth(&self) -> usize {
        VersionedStore::undo_depth(self)
    }

    fn redo_depth(&self) -> usize {
        VersionedStore::redo_depth(self)
    }

    fn trim_oldest(&mut self) -> bool {
        self.history.trim_oldest()
    }

    fn has_uncommitted_changes(&self) -> bool {
        self.dirty
    }

    fn discard_uncommitted(&mut self) {
        VersionedStore::discard_uncommitted(self);
    }

    fn record_count(&self) -> usize {
        self.live.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Person;

    fn alice() -> Person {
        Person::new("Alice").with_phone("9111")
    }

    fn bob() -> Person {
        Person::new("Bob").with_phone("9222")
    }

    #[test]
    fn mutations_do_not_commit() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        store.add(alice());
        assert_eq!(store.len(), 1);
        assert!(store.has_uncommitted_changes());
        assert!(store.committed().is_empty());
        assert!(!store.can_undo());
    }

    #[test]
    fn commit_then_undo_restores_previous_contents() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        store.add(alice());
        store.commit();
        assert!(store.can_undo());

        store.undo_one_step().unwrap();
        assert!(store.is_empty());
        assert!(store.can_redo());

        store.redo_one_step().unwrap();
        assert!(store.contains(&alice()));
    }

    #[test]
    fn update_replaces_matching_record() {
        let mut store = VersionedStore::new(StoreTag::Records, [alice(), bob()]);
        let edited = alice().with_email("alice@example.com");
        store.update_one(&alice(), edited.clone()).unwrap();
        assert_eq!(store.items()[0], edited);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_missing_record_leaves_collection_untouched() {
        let mut store = VersionedStore::new(StoreTag::Records, [alice()]);
        let before = store.version();
        let err = store.update_one(&bob(), bob()).unwrap_err();
        assert_eq!(err, StoreError::RecordNotFound { tag: StoreTag::Records });
        assert_eq!(store.version(), before);
        assert!(!store.has_uncommitted_changes());
    }

    #[test]
    fn delete_returns_removed_record() {
        let mut store = VersionedStore::new(StoreTag::Records, [alice(), bob()]);
        let removed = store.delete_one(&bob()).unwrap();
        assert_eq!(removed, bob());
        assert!(!store.contains(&bob()));
        assert!(store.delete_one(&bob()).is_err());
    }

    #[test]
    fn reset_all_replaces_contents() {
        let mut store = VersionedStore::new(StoreTag::Records, [alice()]);
        store.reset_all(vec![bob()]);
        assert_eq!(store.full_snapshot(), vec![bob()]);
    }

    #[test]
    fn apply_dispatches_each_mutation() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        store.apply(Mutation::Add(alice())).unwrap();
        store
            .apply(Mutation::Update {
                target: alice(),
                replacement: bob(),
            })
            .unwrap();
        assert_eq!(store.full_snapshot(), vec![bob()]);
        store.apply(Mutation::Delete(bob())).unwrap();
        assert!(store.is_empty());
        store.apply(Mutation::ResetAll(vec![alice(), bob()])).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.apply(Mutation::Delete(Person::new("Carol"))).is_err());
    }

    #[test]
    fn discard_uncommitted_restores_snapshot() {
        let mut store = VersionedStore::new(StoreTag::Records, [alice()]);
        store.add(bob());
        store.discard_uncommitted();
        assert_eq!(store.full_snapshot(), vec![alice()]);
        assert!(!store.has_uncommitted_changes());
    }

    #[test]
    fn undo_overwrites_uncommitted_changes() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        store.add(alice());
        store.commit();
        store.add(bob());
        store.undo_one_step().unwrap();
        assert!(store.is_empty());
        assert!(!store.has_uncommitted_changes());
    }

    #[test]
    fn snapshots_are_not_affected_by_later_mutations() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        store.add(alice());
        store.commit();
        let frozen = std::sync::Arc::clone(store.committed());
        store.update_one(&alice(), bob()).unwrap();
        assert_eq!(frozen[0], alice());
    }

    #[test]
    fn contains_same_uses_identity() {
        let store = VersionedStore::new(StoreTag::Records, [alice()]);
        assert!(store.contains_same(&Person::new("ALICE")));
        assert!(!store.contains(&Person::new("ALICE")));
    }

    #[test]
    fn version_bumps_on_every_live_change() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        assert_eq!(store.version(), 0);
        store.add(alice());
        store.commit();
        assert_eq!(store.version(), 1);
        store.undo_one_step().unwrap();
        assert_eq!(store.version(), 2);
        store.redo_one_step().unwrap();
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn view_tracks_live_collection() {
        let mut store = VersionedStore::new(StoreTag::Records, [alice(), bob()]);
        store.set_filter(Box::new(|p: &Person| p.name.starts_with('B')), None);
        assert_eq!(store.view().items(), &[bob()]);

        store.add(Person::new("Bea"));
        assert_eq!(store.view().len(), 2);
        assert_eq!(store.view().source_version(), store.version());

        store.discard_uncommitted();
        assert_eq!(store.view().items(), &[bob()]);
    }

    #[test]
    fn view_predicate_survives_undo() {
        let mut store = VersionedStore::empty(StoreTag::Records);
        store.set_filter(Box::new(|p: &Person| p.name == "Alice"), None);
        store.add(alice());
        store.commit();
        assert_eq!(store.view().len(), 1);
        store.undo_one_step().unwrap();
        assert!(store.view().is_empty());
        store.redo_one_step().unwrap();
        assert_eq!(store.view().items(), &[alice()]);
    }

    #[test]
    fn erased_history_downcasts_to_store() {
        let store: Box<dyn VersionedHistory> =
            Box::new(VersionedStore::new(StoreTag::Records, [alice()]));
        assert_eq!(store.tag(), StoreTag::Records);
        assert_eq!(store.record_count(), 1);
        let typed = store
            .as_any()
            .downcast_ref::<VersionedStore<Person>>()
            .unwrap();
        assert!(typed.contains(&alice()));
    }
}
