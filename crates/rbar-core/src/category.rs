#![forbid(unsafe_code)]

//! Category ordering and per-category visibility flags.
//!
//! Operators type class lists such as `"war pal shd"`. Those lists drive the
//! render order ([`CategoryPriorityOrder`]) and the always/never/filter sets
//! ([`VisibilityFlags`]).
//!
//! # Invariants
//!
//! 1. A [`CategoryPriorityOrder`] is always a complete permutation of
//!    [`Category::ALL`], whatever override it was built from.
//! 2. Overrides are applied first-mention-wins; duplicates are dropped and
//!    unknown tokens ignored.
//! 3. `never` takes precedence over `always` and `filter`.

use std::fmt;

use crate::roster::Category;

/// Default render order: likeliest to need attention first.
pub const DEFAULT_PRIORITY: [Category; Category::COUNT] = [
    Category::Warrior,
    Category::Paladin,
    Category::Shadowknight,
    Category::Enchanter,
    Category::Wizard,
    Category::Monk,
    Category::Ranger,
    Category::Rogue,
    Category::Beastlord,
    Category::Bard,
    Category::Cleric,
    Category::Shaman,
    Category::Druid,
    Category::Magician,
    Category::Necromancer,
];

/// Result of parsing a whitespace-separated class list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryList {
    /// Recognized categories in first-mention order, without duplicates.
    pub categories: Vec<Category>,
    /// Tokens that did not name a category.
    pub unknown: Vec<String>,
}

/// Parse a class list like `"WAR pal  Shd"`.
#[must_use]
pub fn parse_category_list(text: &str) -> CategoryList {
    let mut list = CategoryList::default();
    for token in text.split_whitespace() {
        match Category::from_short_name(token) {
            Some(category) if !list.categories.contains(&category) => {
                list.categories.push(category);
            }
            Some(_) => {}
            None => list.unknown.push(token.to_owned()),
        }
    }
    list
}

// ---------------------------------------------------------------------------
// CategorySet
// ---------------------------------------------------------------------------

/// A set of categories stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategorySet {
    mask: u16,
}

impl CategorySet {
    pub const EMPTY: Self = Self { mask: 0 };

    #[must_use]
    pub fn from_list(text: &str) -> Self {
        parse_category_list(text).categories.into_iter().collect()
    }

    #[inline]
    pub const fn contains(self, category: Category) -> bool {
        self.mask & (1 << category.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, category: Category) {
        self.mask |= 1 << category.index();
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.mask == 0
    }

    /// Members in index order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL
            .into_iter()
            .filter(move |category| self.contains(*category))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_short_names(f, self.iter())
    }
}

// ---------------------------------------------------------------------------
// CategoryPriorityOrder
// ---------------------------------------------------------------------------

/// The order in which categories are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryPriorityOrder {
    order: [Category; Category::COUNT],
}

impl Default for CategoryPriorityOrder {
    fn default() -> Self {
        Self {
            order: DEFAULT_PRIORITY,
        }
    }
}

impl CategoryPriorityOrder {
    /// Build from a partial override: listed categories first, the rest in
    /// default order. An empty or fully unrecognized list yields the default.
    #[must_use]
    pub fn from_override(text: &str) -> Self {
        let listed = parse_category_list(text).categories;
        let mut order = DEFAULT_PRIORITY;
        let tail = DEFAULT_PRIORITY
            .into_iter()
            .filter(|category| !listed.contains(category));
        for (slot, category) in order.iter_mut().zip(listed.iter().copied().chain(tail)) {
            *slot = category;
        }
        Self { order }
    }

    /// Categories in render order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[Category] {
        &self.order
    }

    /// Position of `category` in the order.
    #[must_use]
    pub fn rank(&self, category: Category) -> usize {
        self.order
            .iter()
            .position(|candidate| *candidate == category)
            .unwrap_or(Category::COUNT)
    }
}

impl fmt::Display for CategoryPriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_short_names(f, self.iter())
    }
}

// ---------------------------------------------------------------------------
// VisibilityFlags
// ---------------------------------------------------------------------------

/// Per-category visibility switches. Consulted together, `never` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisibilityFlags {
    /// Always shown regardless of health threshold.
    pub always: CategorySet,
    /// Never shown.
    pub never: CategorySet,
    /// Shown only at or below the configured health threshold.
    pub filter: CategorySet,
}

impl VisibilityFlags {
    #[inline]
    pub const fn is_hidden(&self, category: Category) -> bool {
        self.never.contains(category)
    }

    #[inline]
    pub const fn is_always(&self, category: Category) -> bool {
        !self.is_hidden(category) && self.always.contains(category)
    }

    #[inline]
    pub const fn is_filtered(&self, category: Category) -> bool {
        !self.is_hidden(category) && self.filter.contains(category)
    }
}

fn write_short_names(
    f: &mut fmt::Formatter<'_>,
    categories: impl Iterator<Item = Category>,
) -> fmt::Result {
    for (i, category) in categories.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        f.write_str(category.short_name())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_is_permutation() {
        let mut sorted = DEFAULT_PRIORITY;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn override_goes_first_then_defaults() {
        let order = CategoryPriorityOrder::from_override("clr shm");
        assert_eq!(&order.as_slice()[..3], &[Category::Cleric, Category::Shaman, Category::Warrior]);
        assert_eq!(order.rank(Category::Cleric), 0);
        assert_eq!(order.rank(Category::Necromancer), Category::COUNT - 1);
    }

    #[test]
    fn duplicates_and_unknown_tokens_are_ignored() {
        let list = parse_category_list("WAR foo war  ENC");
        assert_eq!(list.categories, vec![Category::Warrior, Category::Enchanter]);
        assert_eq!(list.unknown, vec!["foo".to_owned()]);

        let order = CategoryPriorityOrder::from_override("nope nada");
        assert_eq!(order, CategoryPriorityOrder::default());
    }

    #[test]
    fn display_lists_short_names() {
        let order = CategoryPriorityOrder::default();
        assert!(order.to_string().starts_with("WAR PAL SHD ENC"));
        assert_eq!(CategorySet::from_list("shd war").to_string(), "WAR SHD");
        assert_eq!(CategorySet::EMPTY.to_string(), "");
    }

    #[test]
    fn never_wins() {
        let flags = VisibilityFlags {
            always: CategorySet::from_list("WAR CLR"),
            never: CategorySet::from_list("WAR"),
            filter: CategorySet::from_list("WAR"),
        };
        assert!(flags.is_hidden(Category::Warrior));
        assert!(!flags.is_always(Category::Warrior));
        assert!(!flags.is_filtered(Category::Warrior));
        assert!(flags.is_always(Category::Cleric));
    }
}
