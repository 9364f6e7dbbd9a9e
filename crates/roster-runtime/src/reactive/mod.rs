#![forbid(unsafe_code)]

//! Derived, non-versioned state computed from versioned stores.
//!
//! - [`filtered_view`]: predicate-filtered, optionally sorted views

pub mod filtered_view;

pub use filtered_view::{FilteredView, Predicate, SortOrder};
