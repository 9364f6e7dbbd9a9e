#![forbid(unsafe_code)]

//! Top-level error type for roster applications.
//!
//! Each layer keeps its own typed error ([`CoordinatorError`],
//! [`ConfigError`], [`PersistenceError`]); [`Error`] wraps them so a command
//! handler can `?` across layers and still match on what matters.
//!
//! [`Error::Rejected`] carries a message meant for the user as-is. Everything
//! else is either a domain conflict or a fault to be logged.

use std::fmt;

use roster_core::StoreTag;
use roster_runtime::{ConfigError, CoordinatorError};

use crate::persistence::PersistenceError;

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// The command could not run; the message is shown to the user.
    Rejected(String),
    /// A record denoting the same entity already exists in the store.
    Duplicate(StoreTag),
    /// Coordinator failure. Only [`CoordinatorError::HistoryDesynchronized`]
    /// indicates a defect.
    Coordinator(CoordinatorError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// A persistence collaborator failed.
    Persistence(PersistenceError),
    /// The tracing subscriber could not be installed.
    Telemetry(String),
}

impl Error {
    /// Whether this reflects a broken invariant rather than bad input.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::Coordinator(err) if err.is_defect())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(msg) => write!(f, "{msg}"),
            Self::Duplicate(tag) => match tag {
                StoreTag::Records => write!(f, "This person already exists in the records"),
                StoreTag::Schedules => {
                    write!(f, "This person already has a schedule in that slot")
                }
                StoreTag::Expenses => write!(f, "This expense already exists"),
                StoreTag::RecruitmentPosts => write!(f, "This recruitment post already exists"),
            },
            Self::Coordinator(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Telemetry(msg) => write!(f, "telemetry: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Coordinator(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Rejected(_) | Self::Duplicate(_) | Self::Telemetry(_) => None,
        }
    }
}

impl From<CoordinatorError> for Error {
    fn from(err: CoordinatorError) -> Self {
        Self::Coordinator(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<PersistenceError> for Error {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

/// Standard result type for roster APIs.
pub type Result<T> = std::result::Result<T, Error>;
