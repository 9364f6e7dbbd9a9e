#![forbid(unsafe_code)]

//! Reference command layer.
//!
//! Each function here is one user command. It validates, mutates the live
//! collections through the [`Coordinator`], and commits exactly the stores
//! it touched as one action, so a single [`undo`] reverses it.
//!
//! Duplicate detection is an explicit [`DuplicateCheck`] value computed
//! before the command runs and passed in; nothing is shared between
//! commands.
//!
//! ```ignore
//! let check = DuplicateCheck::against(&coordinator, StoreTag::Records, &person)?;
//! let result = actions::add_person(&mut coordinator, person, check)?;
//! println!("{}", result.feedback);
//! ```

use roster_core::{Expense, Person, Record, RecruitmentPost, Schedule, StoreTag, TagSet};
use roster_runtime::{Coordinator, CoordinatorError, Mutation};
use tracing::debug;

use crate::error::{Error, Result};

pub const MESSAGE_UNDO_SUCCESS: &str = "Undo success!";
pub const MESSAGE_REDO_SUCCESS: &str = "Redo success!";
pub const MESSAGE_NO_UNDO: &str = "No more commands to undo!";
pub const MESSAGE_NO_REDO: &str = "No more commands to redo!";
pub const MESSAGE_CLEARED: &str = "All records have been cleared!";
pub const MESSAGE_PERSON_NOT_FOUND: &str = "The person provided is not in the records";

/// What a successful command reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Message for the user.
    pub feedback: String,
    /// Stores the command committed.
    pub touched: TagSet,
}

impl CommandResult {
    fn new(feedback: impl Into<String>, touched: TagSet) -> Self {
        Self {
            feedback: feedback.into(),
            touched,
        }
    }
}

// ============================================================================
// Duplicate detection
// ============================================================================

/// Outcome of comparing a candidate record with a store's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCheck {
    Unique,
    Duplicate,
}

impl DuplicateCheck {
    /// Check `candidate` against every record in the store under `tag`.
    pub fn against<T: Record>(
        coordinator: &Coordinator,
        tag: StoreTag,
        candidate: &T,
    ) -> Result<Self> {
        let store = coordinator.store::<T>(tag)?;
        Ok(Self::from_flag(store.contains_same(candidate)))
    }

    /// Check `candidate` against every record except `replacing`, for edits.
    pub fn against_except<T: Record>(
        coordinator: &Coordinator,
        tag: StoreTag,
        candidate: &T,
        replacing: &T,
    ) -> Result<Self> {
        let store = coordinator.store::<T>(tag)?;
        let clash = store
            .iter()
            .any(|record| record != replacing && record.is_same(candidate));
        Ok(Self::from_flag(clash))
    }

    fn from_flag(duplicate: bool) -> Self {
        if duplicate {
            Self::Duplicate
        } else {
            Self::Unique
        }
    }

    #[must_use]
    pub fn is_duplicate(self) -> bool {
        self == Self::Duplicate
    }

    fn ensure_unique(self, tag: StoreTag) -> Result<()> {
        match self {
            Self::Unique => Ok(()),
            Self::Duplicate => Err(Error::Duplicate(tag)),
        }
    }
}

// ============================================================================
// Add / edit
// ============================================================================

/// Add a person.
pub fn add_person(
    coordinator: &mut Coordinator,
    person: Person,
    check: DuplicateCheck,
) -> Result<CommandResult> {
    check.ensure_unique(StoreTag::Records)?;
    let feedback = format!("New person added: {person}");
    let touched = commit_one(coordinator, StoreTag::Records, Mutation::Add(person))?;
    Ok(logged("add_person", CommandResult::new(feedback, touched)))
}

/// Replace `target` with `edited`. A name change carries over to every
/// schedule and expense the person owns, in the same action.
pub fn edit_person(
    coordinator: &mut Coordinator,
    target: &Person,
    edited: Person,
    check: DuplicateCheck,
) -> Result<CommandResult> {
    check.ensure_unique(StoreTag::Records)?;
    ensure_person_exists(coordinator, target)?;

    let renamed = !target.name.eq_ignore_ascii_case(&edited.name);
    let (schedules, expenses) = if renamed {
        (
            owned_schedules(coordinator, &target.name)?,
            owned_expenses(coordinator, &target.name)?,
        )
    } else {
        (Vec::new(), Vec::new())
    };
    let feedback = format!("Edited person: {edited}");

    let mut action = coordinator.begin_action();
    action.mutate(
        StoreTag::Records,
        Mutation::Update {
            target: target.clone(),
            replacement: edited.clone(),
        },
    )?;
    for schedule in schedules {
        let mut replacement = schedule.clone();
        replacement.owner = edited.name.clone();
        action.mutate(
            StoreTag::Schedules,
            Mutation::Update {
                target: schedule,
                replacement,
            },
        )?;
    }
    for expense in expenses {
        let mut replacement = expense.clone();
        replacement.owner = edited.name.clone();
        action.mutate(
            StoreTag::Expenses,
            Mutation::Update {
                target: expense,
                replacement,
            },
        )?;
    }
    let touched = action.touched();
    action.commit()?;
    Ok(logged("edit_person", CommandResult::new(feedback, touched)))
}

/// Add a schedule entry for an existing person.
pub fn add_schedule(
    coordinator: &mut Coordinator,
    schedule: Schedule,
    check: DuplicateCheck,
) -> Result<CommandResult> {
    check.ensure_unique(StoreTag::Schedules)?;
    ensure_owner_exists(coordinator, schedule.owner())?;
    let feedback = format!(
        "New schedule added: {} on {} at {} for {}",
        schedule.title, schedule.date, schedule.time, schedule.owner
    );
    let touched = commit_one(coordinator, StoreTag::Schedules, Mutation::Add(schedule))?;
    Ok(logged("add_schedule", CommandResult::new(feedback, touched)))
}

/// Add an expense claim for an existing person.
pub fn add_expense(
    coordinator: &mut Coordinator,
    expense: Expense,
    check: DuplicateCheck,
) -> Result<CommandResult> {
    check.ensure_unique(StoreTag::Expenses)?;
    ensure_owner_exists(coordinator, expense.owner())?;
    let feedback = format!(
        "New expense added: {} ({}) for {}",
        expense.description,
        format_cents(expense.amount),
        expense.owner
    );
    let touched = commit_one(coordinator, StoreTag::Expenses, Mutation::Add(expense))?;
    Ok(logged("add_expense", CommandResult::new(feedback, touched)))
}

/// `-1205` as `-12.05`.
fn format_cents(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let cents = amount.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

/// Add a recruitment post.
pub fn add_post(
    coordinator: &mut Coordinator,
    post: RecruitmentPost,
    check: DuplicateCheck,
) -> Result<CommandResult> {
    check.ensure_unique(StoreTag::RecruitmentPosts)?;
    let feedback = format!(
        "New recruitment post added: {} ({})",
        post.job_title, post.department
    );
    let touched = commit_one(coordinator, StoreTag::RecruitmentPosts, Mutation::Add(post))?;
    Ok(logged("add_post", CommandResult::new(feedback, touched)))
}

// ============================================================================
// Delete / clear
// ============================================================================

/// Delete a person together with every schedule and expense they own, as
/// one grouped commit of exactly the stores that changed.
pub fn delete_person(coordinator: &mut Coordinator, target: &Person) -> Result<CommandResult> {
    ensure_person_exists(coordinator, target)?;
    let schedules = owned_schedules(coordinator, &target.name)?;
    let expenses = owned_expenses(coordinator, &target.name)?;

    let mut action = coordinator.begin_action();
    action.mutate(StoreTag::Records, Mutation::Delete(target.clone()))?;
    for schedule in schedules {
        action.mutate(StoreTag::Schedules, Mutation::Delete(schedule))?;
    }
    for expense in expenses {
        action.mutate(StoreTag::Expenses, Mutation::Delete(expense))?;
    }
    let touched = action.touched();
    action.commit()?;
    Ok(logged(
        "delete_person",
        CommandResult::new(format!("Deleted person: {target}"), touched),
    ))
}

/// Delete a person with one commit per store, chained into one action.
///
/// Always commits records, schedules and expenses (when registered), even
/// if the person owns nothing; [`undo`] still reverses it in one call.
pub fn delete_person_chained(
    coordinator: &mut Coordinator,
    target: &Person,
) -> Result<CommandResult> {
    ensure_person_exists(coordinator, target)?;
    let schedules = owned_schedules(coordinator, &target.name)?;
    let expenses = owned_expenses(coordinator, &target.name)?;
    let registered = coordinator.registered();

    coordinator.mutate(StoreTag::Records, Mutation::Delete(target.clone()))?;
    coordinator.commit(TagSet::RECORDS)?;
    let mut touched = TagSet::RECORDS;

    if registered.has(StoreTag::Schedules) {
        for schedule in schedules {
            coordinator.mutate(StoreTag::Schedules, Mutation::Delete(schedule))?;
        }
        coordinator.commit_chained(TagSet::SCHEDULES)?;
        touched.add(StoreTag::Schedules);
    }
    if registered.has(StoreTag::Expenses) {
        for expense in expenses {
            coordinator.mutate(StoreTag::Expenses, Mutation::Delete(expense))?;
        }
        coordinator.commit_chained(TagSet::EXPENSES)?;
        touched.add(StoreTag::Expenses);
    }
    Ok(logged(
        "delete_person_chained",
        CommandResult::new(format!("Deleted person: {target}"), touched),
    ))
}

/// Empty every registered store in one action.
pub fn clear_all(coordinator: &mut Coordinator) -> Result<CommandResult> {
    let registered = coordinator.registered();
    let mut action = coordinator.begin_action();
    if registered.has(StoreTag::Records) {
        action.mutate::<Person>(StoreTag::Records, Mutation::ResetAll(Vec::new()))?;
    }
    if registered.has(StoreTag::Schedules) {
        action.mutate::<Schedule>(StoreTag::Schedules, Mutation::ResetAll(Vec::new()))?;
    }
    if registered.has(StoreTag::Expenses) {
        action.mutate::<Expense>(StoreTag::Expenses, Mutation::ResetAll(Vec::new()))?;
    }
    if registered.has(StoreTag::RecruitmentPosts) {
        action.mutate::<RecruitmentPost>(
            StoreTag::RecruitmentPosts,
            Mutation::ResetAll(Vec::new()),
        )?;
    }
    let touched = action.touched();
    action.commit()?;
    Ok(logged("clear_all", CommandResult::new(MESSAGE_CLEARED, touched)))
}

// ============================================================================
// Listing
// ============================================================================

/// Show persons whose name contains any of `keywords` as a whole word,
/// ignoring case.
pub fn find_people(coordinator: &mut Coordinator, keywords: &[&str]) -> Result<CommandResult> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let view = coordinator.filtered_view::<Person>(
        StoreTag::Records,
        move |person| {
            person
                .name
                .split_whitespace()
                .any(|word| keywords.contains(&word.to_lowercase()))
        },
        None,
    )?;
    Ok(CommandResult::new(
        format!("{} persons listed!", view.len()),
        TagSet::empty(),
    ))
}

/// Show every person.
pub fn list_people(coordinator: &mut Coordinator) -> Result<CommandResult> {
    coordinator.filtered_view::<Person>(StoreTag::Records, |_| true, None)?;
    Ok(CommandResult::new("Listed all persons", TagSet::empty()))
}

// ============================================================================
// Undo / redo
// ============================================================================

/// Undo the most recent action, however many commits it spans.
pub fn undo(coordinator: &mut Coordinator) -> Result<CommandResult> {
    match coordinator.undo_action() {
        Ok(report) => Ok(logged(
            "undo",
            CommandResult::new(MESSAGE_UNDO_SUCCESS, report.touched()),
        )),
        Err(CoordinatorError::NoUndoableState) => Err(Error::Rejected(MESSAGE_NO_UNDO.into())),
        Err(err) => Err(err.into()),
    }
}

/// Redo the most recently undone action.
pub fn redo(coordinator: &mut Coordinator) -> Result<CommandResult> {
    match coordinator.redo_action() {
        Ok(report) => Ok(logged(
            "redo",
            CommandResult::new(MESSAGE_REDO_SUCCESS, report.touched()),
        )),
        Err(CoordinatorError::NoRedoableState) => Err(Error::Rejected(MESSAGE_NO_REDO.into())),
        Err(err) => Err(err.into()),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn commit_one<T: Record>(
    coordinator: &mut Coordinator,
    tag: StoreTag,
    mutation: Mutation<T>,
) -> Result<TagSet> {
    let mut action = coordinator.begin_action();
    action.mutate(tag, mutation)?;
    let touched = action.touched();
    action.commit()?;
    Ok(touched)
}

fn ensure_person_exists(coordinator: &Coordinator, person: &Person) -> Result<()> {
    if coordinator.store::<Person>(StoreTag::Records)?.contains(person) {
        Ok(())
    } else {
        Err(Error::Rejected(MESSAGE_PERSON_NOT_FOUND.into()))
    }
}

fn ensure_owner_exists(coordinator: &Coordinator, owner: &str) -> Result<()> {
    let exists = coordinator
        .store::<Person>(StoreTag::Records)?
        .find(|person| person.name.eq_ignore_ascii_case(owner))
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(Error::Rejected(format!("No person named {owner} in the records")))
    }
}

fn owned_schedules(coordinator: &Coordinator, owner: &str) -> Result<Vec<Schedule>> {
    if !coordinator.registered().has(StoreTag::Schedules) {
        return Ok(Vec::new());
    }
    Ok(coordinator
        .store::<Schedule>(StoreTag::Schedules)?
        .iter()
        .filter(|s| s.owner().eq_ignore_ascii_case(owner))
        .cloned()
        .collect())
}

fn owned_expenses(coordinator: &Coordinator, owner: &str) -> Result<Vec<Expense>> {
    if !coordinator.registered().has(StoreTag::Expenses) {
        return Ok(Vec::new());
    }
    Ok(coordinator
        .store::<Expense>(StoreTag::Expenses)?
        .iter()
        .filter(|e| e.owner().eq_ignore_ascii_case(owner))
        .cloned()
        .collect())
}

fn logged(command: &'static str, result: CommandResult) -> CommandResult {
    debug!(command, touched = %result.touched, "command executed");
    result
}
