#![forbid(unsafe_code)]

//! Cell producers: turn roster buckets into an ordered cell sequence.
//!
//! Two orders are supported.
//!
//! - [`by_category`]: categories in priority order, members by name, with
//!   visibility flags and the health threshold applied. The local player is
//!   never listed.
//! - [`by_group`]: the 13 group slots in fixed order, each non-empty slot
//!   introduced by a label cell. Members keep category priority order with
//!   the leader moved to the front. With show-all, numbered groups are
//!   padded with empty cells up to capacity.
//!
//! Producers emit every cell they would draw; [`crate::flow::flow`] decides
//! which of them fit.

use rbar_core::category::{CategoryPriorityOrder, VisibilityFlags};
use rbar_core::host::LiveEntityResolver;
use rbar_core::roster::{CategoryBuckets, EntityHandle, GROUP_CAPACITY, GroupSlot, RosterEntry};

use crate::cell::{EntryCell, VisibleCell};

/// Threshold that hides nothing but full-health members.
pub const FULL_HEALTH: u8 = 100;

/// Inputs shared by both producers.
pub struct ArrangeContext<'a> {
    pub priority: &'a CategoryPriorityOrder,
    pub flags: &'a VisibilityFlags,
    /// Show every member regardless of health, and pad groups.
    pub show_all: bool,
    /// Health percent at or above which filtered categories are hidden.
    pub threshold: u8,
    /// The local player's handle, skipped by [`by_category`].
    pub self_handle: Option<EntityHandle>,
    pub resolver: &'a dyn LiveEntityResolver,
}

impl ArrangeContext<'_> {
    fn cell_for(&self, entry: &RosterEntry) -> EntryCell {
        let vitals = entry.live.and_then(|handle| self.resolver.vitals(handle));
        EntryCell::from_entry(entry, vitals)
    }

    fn is_self(&self, entry: &RosterEntry) -> bool {
        self.self_handle.is_some() && entry.live == self.self_handle
    }
}

/// Cells in category priority order.
#[must_use]
pub fn by_category(buckets: &CategoryBuckets, ctx: &ArrangeContext<'_>) -> Vec<VisibleCell> {
    let mut cells = Vec::with_capacity(buckets.len());
    for category in ctx.priority.iter() {
        let bucket = buckets.bucket(category);
        if bucket.is_empty() || ctx.flags.is_hidden(category) {
            continue;
        }
        let show = ctx.show_all || ctx.flags.is_always(category);
        let threshold = if ctx.flags.is_filtered(category) {
            ctx.threshold
        } else {
            FULL_HEALTH
        };

        for entry in bucket {
            if ctx.is_self(entry) {
                continue;
            }
            let cell = ctx.cell_for(entry);
            if cell.health_percent >= threshold && !show {
                continue;
            }
            cells.push(VisibleCell::Entry(cell));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(cells = cells.len(), "arranged by category");
    cells
}

/// Cells grouped under per-slot labels.
#[must_use]
pub fn by_group(buckets: &CategoryBuckets, ctx: &ArrangeContext<'_>) -> Vec<VisibleCell> {
    let mut cells = Vec::new();
    let mut members: Vec<&RosterEntry> = Vec::new();
    for slot in GroupSlot::all() {
        let affiliation = slot.affiliation();
        let limit = slot.listing_limit();

        members.clear();
        for category in ctx.priority.iter() {
            for entry in buckets.bucket(category) {
                if entry.group != affiliation || members.len() >= limit {
                    continue;
                }
                if entry.is_leader {
                    members.insert(0, entry);
                } else {
                    members.push(entry);
                }
            }
        }
        if members.is_empty() {
            continue;
        }

        cells.push(VisibleCell::Label(slot));
        cells.extend(
            members
                .iter()
                .map(|entry| VisibleCell::Entry(ctx.cell_for(entry))),
        );
        if ctx.show_all && !affiliation.is_unaffiliated() {
            let padding = GROUP_CAPACITY.saturating_sub(members.len());
            cells.extend(std::iter::repeat_n(VisibleCell::Empty, padding));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(cells = cells.len(), "arranged by group");
    cells
}
