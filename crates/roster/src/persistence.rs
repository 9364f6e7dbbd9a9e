#![forbid(unsafe_code)]

//! Persistence collaborator contract.
//!
//! The coordinator never reads or writes storage. A collaborator supplies
//! each store's initial collection once at startup ([`CollectionSource`])
//! and is handed owned copies of committed collections to write back
//! ([`CollectionSink`]). [`bootstrap`](crate::bootstrap) wires the two to a
//! [`Coordinator`](roster_runtime::Coordinator).
//!
//! - [`MemorySource`]: in-memory collections, for tests and demos
//! - `JsonDirectory` (feature `json-store`): one JSON file per store

use std::any::type_name;
use std::fmt;

use roster_core::{Expense, Person, Record, RecruitmentPost, Schedule, StoreTag};

/// Supplies a store's initial collection.
pub trait CollectionSource<T: Record> {
    fn load_initial(&self, tag: StoreTag) -> Result<Vec<T>, PersistenceError>;
}

/// Accepts a store's collection for writing.
pub trait CollectionSink<T: Record> {
    fn save(&mut self, tag: StoreTag, records: &[T]) -> Result<(), PersistenceError>;
}

/// Errors raised by persistence collaborators.
#[derive(Debug)]
pub enum PersistenceError {
    /// The collaborator keeps no collection of this record type under the tag.
    UnsupportedTag {
        tag: StoreTag,
        record: &'static str,
    },
    /// I/O failure.
    Io(std::io::Error),
    /// Stored data could not be decoded or encoded.
    Format { tag: StoreTag, message: String },
}

impl PersistenceError {
    fn unsupported<T>(tag: StoreTag) -> Self {
        Self::UnsupportedTag {
            tag,
            record: type_name::<T>(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedTag { tag, record } => {
                write!(f, "no {record} collection stored under {tag}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format { tag, message } => write!(f, "malformed {tag} data: {message}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// Four in-memory collections, readable and writable by tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySource {
    pub people: Vec<Person>,
    pub schedules: Vec<Schedule>,
    pub expenses: Vec<Expense>,
    pub posts: Vec<RecruitmentPost>,
    saves: usize,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_people(mut self, people: impl IntoIterator<Item = Person>) -> Self {
        self.people = people.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_schedules(mut self, schedules: impl IntoIterator<Item = Schedule>) -> Self {
        self.schedules = schedules.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_expenses(mut self, expenses: impl IntoIterator<Item = Expense>) -> Self {
        self.expenses = expenses.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_posts(mut self, posts: impl IntoIterator<Item = RecruitmentPost>) -> Self {
        self.posts = posts.into_iter().collect();
        self
    }

    /// Number of successful `save` calls.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }
}

macro_rules! memory_collection {
    ($record:ty, $field:ident, $tag:path) => {
        impl CollectionSource<$record> for MemorySource {
            fn load_initial(&self, tag: StoreTag) -> Result<Vec<$record>, PersistenceError> {
                if tag != $tag {
                    return Err(PersistenceError::unsupported::<$record>(tag));
                }
                Ok(self.$field.clone())
            }
        }

        impl CollectionSink<$record> for MemorySource {
            fn save(&mut self, tag: StoreTag, records: &[$record]) -> Result<(), PersistenceError> {
                if tag != $tag {
                    return Err(PersistenceError::unsupported::<$record>(tag));
                }
                self.$field = records.to_vec();
                self.saves += 1;
                Ok(())
            }
        }
    };
}

memory_collection!(Person, people, StoreTag::Records);
memory_collection!(Schedule, schedules, StoreTag::Schedules);
memory_collection!(Expense, expenses, StoreTag::Expenses);
memory_collection!(RecruitmentPost, posts, StoreTag::RecruitmentPosts);

// ---------------------------------------------------------------------------
// JsonDirectory
// ---------------------------------------------------------------------------

#[cfg(feature = "json-store")]
pub use json::JsonDirectory;

#[cfg(feature = "json-store")]
mod json {
    use std::path::{Path, PathBuf};

    use roster_core::{Record, StoreTag};
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use tracing::debug;

    use super::{CollectionSink, CollectionSource, PersistenceError};

    /// Stores each collection as `<dir>/<tag>.json`.
    ///
    /// A missing file loads as an empty collection.
    #[derive(Debug, Clone)]
    pub struct JsonDirectory {
        dir: PathBuf,
    }

    impl JsonDirectory {
        #[must_use]
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        /// File backing the store under `tag`.
        #[must_use]
        pub fn path_for(&self, tag: StoreTag) -> PathBuf {
            self.dir.join(format!("{}.json", tag.as_str()))
        }

        #[must_use]
        pub fn dir(&self) -> &Path {
            &self.dir
        }
    }

    impl<T: Record + Serialize + DeserializeOwned> CollectionSource<T> for JsonDirectory {
        fn load_initial(&self, tag: StoreTag) -> Result<Vec<T>, PersistenceError> {
            let path = self.path_for(tag);
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    debug!(store = tag.as_str(), "no data file, starting empty");
                    return Ok(Vec::new());
                }
                Err(err) => return Err(err.into()),
            };
            serde_json::from_str(&content).map_err(|err| PersistenceError::Format {
                tag,
                message: err.to_string(),
            })
        }
    }

    impl<T: Record + Serialize + DeserializeOwned> CollectionSink<T> for JsonDirectory {
        fn save(&mut self, tag: StoreTag, records: &[T]) -> Result<(), PersistenceError> {
            std::fs::create_dir_all(&self.dir)?;
            let json = serde_json::to_string_pretty(records).map_err(|err| {
                PersistenceError::Format {
                    tag,
                    message: err.to_string(),
                }
            })?;
            std::fs::write(self.path_for(tag), json)?;
            debug!(store = tag.as_str(), records = records.len(), "collection saved");
            Ok(())
        }
    }
}
