#![forbid(unsafe_code)]

//! Roster core types.
//!
//! This crate holds the pure values shared by every other roster crate:
//!
//! - [`StoreTag`] / [`TagSet`] - which versioned collection(s) an action touched
//! - [`Record`] - the bound every stored value satisfies
//! - [`Person`], [`Schedule`], [`Expense`], [`RecruitmentPost`] - the four
//!   domain record types
//!
//! # Role in roster
//! `roster-core` has no behavior beyond equality and identity. The history
//! machinery lives in `roster-runtime`; the command layer lives in `roster`.

pub mod record;
pub mod tag;

pub use record::{Expense, Person, Record, RecruitmentPost, Schedule};
pub use tag::{StoreTag, TagSet};
