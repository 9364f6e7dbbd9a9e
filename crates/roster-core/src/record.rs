#![forbid(unsafe_code)]

//! Record types held by the versioned stores.
//!
//! Field values are carried as given; format validation (phone numbers,
//! dates, salary ranges) belongs to the command layer.

use std::fmt;

/// A value that can live in a versioned store.
///
/// `PartialEq` is full equality (used to locate the exact record for
/// update and delete). [`is_same`](Record::is_same) is the weaker identity
/// used for duplicate detection.
pub trait Record: Clone + PartialEq + fmt::Debug + 'static {
    /// Whether `other` denotes the same real-world entity.
    fn is_same(&self, other: &Self) -> bool;
}

/// An entry in the person directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub department: String,
}

impl Person {
    /// Create a person with empty contact fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            department: String::new(),
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }
}

impl Record for Person {
    fn is_same(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.department.is_empty() {
            write!(f, " ({})", self.department)?;
        }
        Ok(())
    }
}

/// An appointment in the schedule log, owned by a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    pub owner: String,
    pub date: String,
    pub time: String,
    pub title: String,
}

impl Schedule {
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            date: date.into(),
            time: time.into(),
            title: title.into(),
        }
    }

    /// Name of the person this entry belongs to.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl Record for Schedule {
    // One person cannot be booked twice in the same slot.
    fn is_same(&self, other: &Self) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner)
            && self.date == other.date
            && self.time == other.time
    }
}

/// A claim in the expense ledger, owned by a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expense {
    pub owner: String,
    /// Amount in cents.
    pub amount: i64,
    pub date: String,
    pub description: String,
}

impl Expense {
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        amount: i64,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            amount,
            date: date.into(),
            description: description.into(),
        }
    }

    /// Name of the person this claim belongs to.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl Record for Expense {
    fn is_same(&self, other: &Self) -> bool {
        self == other
    }
}

/// An open position in the recruitment-post list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecruitmentPost {
    pub job_title: String,
    pub department: String,
    pub description: String,
}

impl RecruitmentPost {
    #[must_use]
    pub fn new(
        job_title: impl Into<String>,
        department: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            department: department.into(),
            description: description.into(),
        }
    }
}

impl Record for RecruitmentPost {
    fn is_same(&self, other: &Self) -> bool {
        self.job_title.eq_ignore_ascii_case(&other.job_title)
            && self.department.eq_ignore_ascii_case(&other.department)
    }
}
