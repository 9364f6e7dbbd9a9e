#![forbid(unsafe_code)]

//! Predicate-filtered, optionally sorted view over a store's live collection.
//!
//! # Design
//!
//! A [`FilteredView<T>`] is a materialized derivation: it owns a predicate,
//! an optional comparator, and the visible items computed from them. The
//! owning store calls [`refresh`](FilteredView::refresh) after every change
//! to its live collection, so the view never lags the collection.
//!
//! The view is not versioned. Undo and redo restore the underlying
//! collection; the predicate set by the command layer stays as it was.
//!
//! # Invariants
//!
//! 1. `items` equals `source.filter(predicate)` (sorted by `sort` if set) for
//!    the source passed to the most recent `refresh`.
//! 2. `source_version` is the store version `items` was computed at.
//! 3. `predicate_version` increments by exactly 1 per predicate change.

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

/// Row filter.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool>;

/// Row comparator.
pub type SortOrder<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// Materialized filtered view over a collection.
pub struct FilteredView<T> {
    predicate: Predicate<T>,
    sort: Option<SortOrder<T>>,
    items: Vec<T>,
    source_version: u64,
    predicate_version: u64,
}

impl<T: fmt::Debug> fmt::Debug for FilteredView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredView")
            .field("items", &self.items)
            .field("sorted", &self.sort.is_some())
            .field("source_version", &self.source_version)
            .field("predicate_version", &self.predicate_version)
            .finish()
    }
}

impl<T: Clone + 'static> Default for FilteredView<T> {
    fn default() -> Self {
        Self::show_all()
    }
}

impl<T: Clone + 'static> FilteredView<T> {
    /// A view that shows every item in source order.
    #[must_use]
    pub fn show_all() -> Self {
        Self::new(|_: &T| true)
    }

    /// A view filtered by `predicate`, in source order.
    #[must_use]
    pub fn new(predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            sort: None,
            items: Vec::new(),
            source_version: 0,
            predicate_version: 0,
        }
    }

    /// Replace the predicate and comparator. Takes effect on the next
    /// [`refresh`](Self::refresh).
    pub fn set_predicate(&mut self, predicate: Predicate<T>, sort: Option<SortOrder<T>>) {
        self.predicate = predicate;
        self.sort = sort;
        self.predicate_version += 1;
    }

    /// Recompute the visible items from `source`.
    pub fn refresh<'a, I>(&mut self, source: I, source_version: u64)
    where
        I: IntoIterator<Item = &'a T>,
    {
        self.items.clear();
        self.items
            .extend(source.into_iter().filter(|item| (self.predicate)(*item)).cloned());
        if let Some(sort) = &self.sort {
            self.items.sort_by(|a, b| sort(a, b));
        }
        self.source_version = source_version;
        trace!(
            visible = self.items.len(),
            source_version,
            predicate_version = self.predicate_version,
            "filtered view refreshed"
        );
    }

    /// Whether `item` passes the current predicate.
    #[must_use]
    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }
}

impl<T> FilteredView<T> {
    /// The visible items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sort.is_some()
    }

    /// Store version the items were computed at.
    #[must_use]
    pub fn source_version(&self) -> u64 {
        self.source_version
    }

    #[must_use]
    pub fn predicate_version(&self) -> u64 {
        self.predicate_version
    }
}

impl<'a, T> IntoIterator for &'a FilteredView<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_all_keeps_source_order() {
        let mut view = FilteredView::show_all();
        view.refresh(&[3, 1, 2], 1);
        assert_eq!(view.items(), &[3, 1, 2]);
        assert_eq!(view.source_version(), 1);
        assert!(!view.is_sorted());
    }

    #[test]
    fn predicate_filters_items() {
        let mut view = FilteredView::new(|n: &i32| n % 2 == 0);
        view.refresh(&[1, 2, 3, 4], 5);
        assert_eq!(view.items(), &[2, 4]);
        assert!(view.matches(&6));
        assert!(!view.matches(&7));
    }

    #[test]
    fn sort_applies_after_filter() {
        let mut view = FilteredView::show_all();
        view.set_predicate(Box::new(|n: &i32| *n > 1), Some(Box::new(|a: &i32, b: &i32| b.cmp(a))));
        view.refresh(&[2, 5, 1, 3], 2);
        assert_eq!(view.items(), &[5, 3, 2]);
        assert!(view.is_sorted());
    }

    #[test]
    fn predicate_change_bumps_version_without_recomputing() {
        let mut view = FilteredView::show_all();
        view.refresh(&[1, 2], 1);
        view.set_predicate(Box::new(|n: &i32| *n == 1), None);
        assert_eq!(view.predicate_version(), 1);
        assert_eq!(view.len(), 2);
        view.refresh(&[1, 2], 1);
        assert_eq!(view.items(), &[1]);
    }

    #[test]
    fn empty_source_yields_empty_view() {
        let mut view = FilteredView::<u8>::show_all();
        view.refresh(&[], 3);
        assert!(view.is_empty());
        assert_eq!(view.get(0), None);
        assert_eq!((&view).into_iter().count(), 0);
    }
}
