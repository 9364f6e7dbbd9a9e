#![forbid(unsafe_code)]

//! Store identifiers.
//!
//! A [`StoreTag`] names one independently versioned collection. A
//! [`TagSet`] is the set of stores touched by one logical user action and
//! is what the commit order log records per entry.

use std::fmt;

use bitflags::bitflags;

/// Identifies one of the versioned domain collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoreTag {
    /// The person directory.
    Records,
    /// The schedule log.
    Schedules,
    /// The expense ledger.
    Expenses,
    /// The recruitment-post list.
    RecruitmentPosts,
}

impl StoreTag {
    /// Every tag, in declaration order.
    pub const ALL: [StoreTag; 4] = [
        StoreTag::Records,
        StoreTag::Schedules,
        StoreTag::Expenses,
        StoreTag::RecruitmentPosts,
    ];

    /// Stable lowercase label for logs and config keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreTag::Records => "records",
            StoreTag::Schedules => "schedules",
            StoreTag::Expenses => "expenses",
            StoreTag::RecruitmentPosts => "recruitment_posts",
        }
    }

    /// Parse a label produced by [`as_str`](Self::as_str).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == label)
    }

    const fn bit(self) -> TagSet {
        match self {
            StoreTag::Records => TagSet::RECORDS,
            StoreTag::Schedules => TagSet::SCHEDULES,
            StoreTag::Expenses => TagSet::EXPENSES,
            StoreTag::RecruitmentPosts => TagSet::RECRUITMENT_POSTS,
        }
    }
}

impl fmt::Display for StoreTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of [`StoreTag`]s, one bit per store.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TagSet: u8 {
        /// [`StoreTag::Records`].
        const RECORDS           = 0b0001;
        /// [`StoreTag::Schedules`].
        const SCHEDULES         = 0b0010;
        /// [`StoreTag::Expenses`].
        const EXPENSES          = 0b0100;
        /// [`StoreTag::RecruitmentPosts`].
        const RECRUITMENT_POSTS = 0b1000;
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl TagSet {
    /// A set holding exactly `tag`.
    #[must_use]
    pub const fn only(tag: StoreTag) -> Self {
        tag.bit()
    }

    /// Whether `tag` is a member.
    #[must_use]
    pub const fn has(self, tag: StoreTag) -> bool {
        self.contains(tag.bit())
    }

    /// Add `tag` to the set.
    pub fn add(&mut self, tag: StoreTag) {
        self.insert(tag.bit());
    }

    /// Iterate the member tags in declaration order.
    pub fn tags(self) -> impl Iterator<Item = StoreTag> {
        StoreTag::ALL.into_iter().filter(move |tag| self.has(*tag))
    }

    /// Number of member tags.
    #[must_use]
    pub const fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

impl From<StoreTag> for TagSet {
    fn from(tag: StoreTag) -> Self {
        tag.bit()
    }
}

impl FromIterator<StoreTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = StoreTag>>(iter: I) -> Self {
        let mut set = TagSet::empty();
        for tag in iter {
            set.add(tag);
        }
        set
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, tag) in self.tags().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(tag.as_str())?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for tag in StoreTag::ALL {
            assert_eq!(StoreTag::from_label(tag.as_str()), Some(tag));
        }
        assert_eq!(StoreTag::from_label("persons"), None);
    }

    #[test]
    fn set_iterates_in_declaration_order() {
        let set: TagSet = [StoreTag::Expenses, StoreTag::Records].into_iter().collect();
        let tags: Vec<_> = set.tags().collect();
        assert_eq!(tags, vec![StoreTag::Records, StoreTag::Expenses]);
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn only_holds_single_member() {
        let set = TagSet::only(StoreTag::Schedules);
        assert!(set.has(StoreTag::Schedules));
        assert!(!set.has(StoreTag::Records));
        assert_eq!(set, TagSet::from(StoreTag::Schedules));
    }

    #[test]
    fn default_is_empty() {
        let set = TagSet::default();
        assert!(set.is_empty());
        assert_eq!(set.tags().count(), 0);
        assert_eq!(set.to_string(), "{}");
    }

    #[test]
    fn display_lists_labels() {
        let mut set = TagSet::only(StoreTag::RecruitmentPosts);
        set.add(StoreTag::Records);
        assert_eq!(set.to_string(), "{records,recruitment_posts}");
    }

    #[test]
    fn all_covers_every_bit() {
        let set: TagSet = StoreTag::ALL.into_iter().collect();
        assert_eq!(set, TagSet::all());
        assert_eq!(set.count(), 4);
    }
}
