#![forbid(unsafe_code)]

//! Roster snapshot: per-category, name-sorted entries joined with live
//! handles.
//!
//! # Lifecycle
//!
//! The snapshot is rebuilt wholesale roughly once a second, or on the next
//! render pass after [`SnapshotCache::mark_dirty`]. Between rebuilds a
//! despawned handle is swept out of every bucket and out of the current
//! visible list, leaving the entries themselves in place.
//!
//! # Invariants
//!
//! 1. After a rebuild each category bucket is strictly ascending by name.
//! 2. The dirty flag is only cleared by `rebuild`.
//! 3. After `on_despawn(h)` nothing in the snapshot or the given visible
//!    list references `h`.

use tracing::debug;

use rbar_core::host::{LiveEntityResolver, RosterSource};
use rbar_core::roster::{Category, CategoryBuckets, EntityHandle, RosterEntry};
use rbar_layout::VisibleList;

/// Milliseconds between timed rebuilds.
pub const REBUILD_INTERVAL_MS: u64 = 1000;

/// Cached roster view.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    buckets: CategoryBuckets,
    next_rebuild_ms: u64,
    dirty: bool,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot from the roster source.
    ///
    /// An inactive roster yields an empty snapshot. Handles that resolve to
    /// non-participants are treated as unreachable.
    pub fn rebuild(
        &mut self,
        now_ms: u64,
        roster: &dyn RosterSource,
        resolver: &dyn LiveEntityResolver,
    ) {
        self.buckets.clear();
        self.next_rebuild_ms = now_ms.saturating_add(REBUILD_INTERVAL_MS);
        self.dirty = false;

        if !roster.is_active() {
            debug!("roster inactive; snapshot cleared");
            return;
        }

        for member in roster.members() {
            if member.name.is_empty() {
                continue;
            }
            let live = resolver
                .resolve(&member.name)
                .filter(|&handle| resolver.is_participant(handle));
            let color = roster.category_color(member.category);
            self.buckets.push(RosterEntry {
                name: member.name,
                category: member.category,
                group: member.group,
                is_leader: member.is_leader,
                live,
                color,
            });
        }
        self.buckets.sort_by_name();

        debug!(
            entries = self.buckets.len(),
            next_rebuild_ms = self.next_rebuild_ms,
            "snapshot rebuilt"
        );
    }

    /// Null every reference to `handle` in the snapshot and `visible`.
    ///
    /// Returns how many references were pruned.
    pub fn on_despawn(&mut self, handle: EntityHandle, visible: &mut VisibleList) -> usize {
        let mut pruned = 0;
        for entry in self.buckets.iter_mut() {
            if entry.live == Some(handle) {
                entry.live = None;
                pruned += 1;
            }
        }
        pruned += visible.prune(handle);
        if pruned > 0 {
            debug!(handle = handle.0, pruned, "despawn swept");
        }
        pruned
    }

    /// Force a rebuild on the next render pass.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the next render pass should rebuild.
    #[must_use]
    pub const fn is_due_for_rebuild(&self, now_ms: u64) -> bool {
        self.dirty || self.next_rebuild_ms <= now_ms
    }

    /// Drop all entries and make the next pass rebuild.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.next_rebuild_ms = 0;
    }

    #[inline]
    pub fn bucket(&self, category: Category) -> &[RosterEntry] {
        self.buckets.bucket(category)
    }

    #[inline]
    pub const fn buckets(&self) -> &CategoryBuckets {
        &self.buckets
    }

    pub fn entries(&self) -> impl Iterator<Item = &RosterEntry> {
        self.buckets.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Whether any entry still holds `handle`.
    #[must_use]
    pub fn references(&self, handle: EntityHandle) -> bool {
        self.entries().any(|entry| entry.live == Some(handle))
    }
}
