#![forbid(unsafe_code)]

//! Roster data model: categories, affiliation groups, and entries.
//!
//! # Invariants
//!
//! 1. [`Category::ALL`] lists every category exactly once, in index order.
//! 2. A [`GroupNumber`] is always in `0..NUM_GROUPS` (displayed one-based).
//! 3. A [`GroupSlot`] is always in `0..NUM_GROUP_SLOTS`; the last slot is the
//!    unaffiliated bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Number of numbered affiliation groups.
pub const NUM_GROUPS: usize = 12;
/// Numbered groups plus the unaffiliated bucket.
pub const NUM_GROUP_SLOTS: usize = NUM_GROUPS + 1;
/// Default members per numbered group.
pub const GROUP_CAPACITY: usize = 6;
/// Maximum roster size; also bounds how many unaffiliated members are listed.
pub const MAX_ROSTER_SIZE: usize = 72;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Participant role. Fixed cardinality; rendering is bucketed by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Warrior,
    Cleric,
    Paladin,
    Ranger,
    Shadowknight,
    Druid,
    Monk,
    Bard,
    Rogue,
    Shaman,
    Necromancer,
    Wizard,
    Magician,
    Enchanter,
    Beastlord,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 15;

    /// Every category in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Warrior,
        Self::Cleric,
        Self::Paladin,
        Self::Ranger,
        Self::Shadowknight,
        Self::Druid,
        Self::Monk,
        Self::Bard,
        Self::Rogue,
        Self::Shaman,
        Self::Necromancer,
        Self::Wizard,
        Self::Magician,
        Self::Enchanter,
        Self::Beastlord,
    ];

    /// Zero-based index into [`Category::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Category::index`].
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Three-letter uppercase abbreviation used in class lists.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Warrior => "WAR",
            Self::Cleric => "CLR",
            Self::Paladin => "PAL",
            Self::Ranger => "RNG",
            Self::Shadowknight => "SHD",
            Self::Druid => "DRU",
            Self::Monk => "MNK",
            Self::Bard => "BRD",
            Self::Rogue => "ROG",
            Self::Shaman => "SHM",
            Self::Necromancer => "NEC",
            Self::Wizard => "WIZ",
            Self::Magician => "MAG",
            Self::Enchanter => "ENC",
            Self::Beastlord => "BST",
        }
    }

    /// Parse a short name, ignoring ASCII case.
    #[must_use]
    pub fn from_short_name(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.short_name().eq_ignore_ascii_case(token))
    }

    /// Bar color used when the roster source has no override.
    #[must_use]
    pub const fn default_color(self) -> Rgba {
        match self {
            Self::Warrior => Rgba::rgb(0xc6, 0x9b, 0x6d),
            Self::Cleric => Rgba::rgb(0xff, 0xff, 0xff),
            Self::Paladin => Rgba::rgb(0xf4, 0x8c, 0xba),
            Self::Ranger => Rgba::rgb(0xab, 0xd4, 0x73),
            Self::Shadowknight => Rgba::rgb(0xa3, 0x30, 0xc9),
            Self::Druid => Rgba::rgb(0xff, 0x7d, 0x0a),
            Self::Monk => Rgba::rgb(0x00, 0xff, 0x96),
            Self::Bard => Rgba::rgb(0xff, 0xf5, 0x69),
            Self::Rogue => Rgba::rgb(0xff, 0xf4, 0x68),
            Self::Shaman => Rgba::rgb(0x00, 0x70, 0xde),
            Self::Necromancer => Rgba::rgb(0x94, 0x82, 0xc9),
            Self::Wizard => Rgba::rgb(0x3f, 0xc7, 0xeb),
            Self::Magician => Rgba::rgb(0x69, 0xcc, 0xf0),
            Self::Enchanter => Rgba::rgb(0xc4, 0x1f, 0x3b),
            Self::Beastlord => Rgba::rgb(0xa9, 0xd2, 0x71),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// A numbered affiliation group, stored zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupNumber(u8);

impl GroupNumber {
    /// Zero-based constructor; `None` past the last group.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_GROUPS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// One-based constructor matching what operators see (`1..=12`).
    #[must_use]
    pub const fn from_display(number: u8) -> Option<Self> {
        if number == 0 {
            None
        } else {
            Self::new(number - 1)
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// One-based number shown to operators and sent on the wire.
    #[inline]
    pub const fn display(self) -> u8 {
        self.0 + 1
    }

    /// All numbered groups in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_GROUPS as u8).map(Self)
    }
}

impl fmt::Display for GroupNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A roster member's affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffiliationGroup {
    Numbered(GroupNumber),
    Unaffiliated,
}

impl AffiliationGroup {
    /// Wire value for move commands: `0` for unaffiliated, else the
    /// one-based group number.
    #[must_use]
    pub const fn command_value(self) -> u8 {
        match self {
            Self::Numbered(group) => group.display(),
            Self::Unaffiliated => 0,
        }
    }

    #[inline]
    pub const fn is_unaffiliated(self) -> bool {
        matches!(self, Self::Unaffiliated)
    }

    /// Label bucket holding this affiliation.
    #[inline]
    pub const fn slot(self) -> GroupSlot {
        match self {
            Self::Numbered(group) => GroupSlot(group.0),
            Self::Unaffiliated => GroupSlot::UNAFFILIATED,
        }
    }
}

impl fmt::Display for AffiliationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(group) => write!(f, "group {group}"),
            Self::Unaffiliated => f.write_str("ungrouped"),
        }
    }
}

/// One of the 13 label buckets: groups 1–12 followed by unaffiliated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupSlot(u8);

impl GroupSlot {
    pub const UNAFFILIATED: Self = Self(NUM_GROUPS as u8);

    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < NUM_GROUP_SLOTS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Every slot in render order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_GROUP_SLOTS as u8).map(Self)
    }

    /// The affiliation this slot collects.
    #[must_use]
    pub const fn affiliation(self) -> AffiliationGroup {
        if self.0 as usize == NUM_GROUPS {
            AffiliationGroup::Unaffiliated
        } else {
            AffiliationGroup::Numbered(GroupNumber(self.0))
        }
    }

    /// Heading text drawn for the slot.
    #[must_use]
    pub fn label(self) -> String {
        match self.affiliation() {
            AffiliationGroup::Numbered(group) => format!("Group {group}:"),
            AffiliationGroup::Unaffiliated => "Ungrouped:".to_owned(),
        }
    }

    /// Members listed under this slot's heading.
    #[must_use]
    pub const fn listing_limit(self) -> usize {
        match self.affiliation() {
            AffiliationGroup::Numbered(_) => GROUP_CAPACITY,
            AffiliationGroup::Unaffiliated => MAX_ROSTER_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Entities and entries
// ---------------------------------------------------------------------------

/// Opaque identity of a live in-world object. Not owned by the overlay; two
/// handles are the same object exactly when they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

/// Roster membership as reported by the roster source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub name: String,
    pub category: Category,
    pub group: AffiliationGroup,
    pub is_leader: bool,
}

impl RosterMember {
    pub fn new(name: impl Into<String>, category: Category, group: AffiliationGroup) -> Self {
        Self {
            name: name.into(),
            category,
            group,
            is_leader: false,
        }
    }

    #[must_use]
    pub fn leader(mut self) -> Self {
        self.is_leader = true;
        self
    }
}

/// A roster member joined with its live handle for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub category: Category,
    pub group: AffiliationGroup,
    pub is_leader: bool,
    /// `None` when the member is out of range or its object despawned.
    pub live: Option<EntityHandle>,
    pub color: Rgba,
}

impl RosterEntry {
    #[inline]
    pub const fn is_reachable(&self) -> bool {
        self.live.is_some()
    }
}

/// Roster entries bucketed by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBuckets {
    buckets: [Vec<RosterEntry>; Category::COUNT],
}

impl CategoryBuckets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bucket(&self, category: Category) -> &[RosterEntry] {
        &self.buckets[category.index()]
    }

    pub fn push(&mut self, entry: RosterEntry) {
        self.buckets[entry.category.index()].push(entry);
    }

    /// Sort every bucket by name.
    pub fn sort_by_name(&mut self) {
        for bucket in &mut self.buckets {
            bucket.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Total entries across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// All entries, category by category in index order.
    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.buckets.iter().flatten()
    }

    /// Mutable access to all entries, for in-place invalidation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RosterEntry> {
        self.buckets.iter_mut().flatten()
    }

    /// Find an entry by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RosterEntry> {
        self.iter().find(|entry| entry.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_indices_match_all() {
        for (index, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), index);
            assert_eq!(Category::from_index(index), Some(*category));
        }
        assert_eq!(Category::from_index(Category::COUNT), None);
    }

    #[test]
    fn short_names_parse_case_insensitively() {
        for category in Category::ALL {
            assert_eq!(Category::from_short_name(category.short_name()), Some(category));
            let lower = category.short_name().to_ascii_lowercase();
            assert_eq!(Category::from_short_name(&lower), Some(category));
        }
        assert_eq!(Category::from_short_name("XYZ"), None);
    }

    #[test]
    fn group_numbers_are_bounded() {
        assert_eq!(GroupNumber::new(11).map(GroupNumber::display), Some(12));
        assert!(GroupNumber::new(12).is_none());
        assert_eq!(GroupNumber::from_display(1).map(GroupNumber::index), Some(0));
        assert!(GroupNumber::from_display(0).is_none());
        assert!(GroupNumber::from_display(13).is_none());
        assert_eq!(GroupNumber::all().count(), NUM_GROUPS);
    }

    #[test]
    fn command_values() {
        let third = AffiliationGroup::Numbered(GroupNumber::from_display(3).unwrap());
        assert_eq!(third.command_value(), 3);
        assert_eq!(AffiliationGroup::Unaffiliated.command_value(), 0);
    }

    #[test]
    fn slots_map_to_affiliations() {
        let slots: Vec<GroupSlot> = GroupSlot::all().collect();
        assert_eq!(slots.len(), NUM_GROUP_SLOTS);
        assert_eq!(slots[12], GroupSlot::UNAFFILIATED);
        assert_eq!(slots[12].affiliation(), AffiliationGroup::Unaffiliated);
        assert_eq!(slots[0].label(), "Group 1:");
        assert_eq!(slots[12].label(), "Ungrouped:");
        for slot in slots {
            assert_eq!(slot.affiliation().slot(), slot);
        }
    }

    #[test]
    fn buckets_sort_per_category() {
        let entry = |name: &str, category| RosterEntry {
            name: name.to_owned(),
            category,
            group: AffiliationGroup::Unaffiliated,
            is_leader: false,
            live: None,
            color: Rgba::WHITE,
        };
        let mut buckets = CategoryBuckets::new();
        buckets.push(entry("Zed", Category::Warrior));
        buckets.push(entry("Mona", Category::Cleric));
        buckets.push(entry("Anna", Category::Warrior));
        buckets.sort_by_name();
        let names: Vec<&str> = buckets
            .bucket(Category::Warrior)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Anna", "Zed"]);
        assert_eq!(buckets.len(), 3);
        assert!(buckets.find("Mona").is_some());
        buckets.clear();
        assert!(buckets.is_empty());
    }

    #[test]
    fn listing_limits() {
        assert_eq!(GroupSlot::new(0).unwrap().listing_limit(), GROUP_CAPACITY);
        assert_eq!(GroupSlot::UNAFFILIATED.listing_limit(), MAX_ROSTER_SIZE);
    }
}
