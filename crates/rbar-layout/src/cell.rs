#![forbid(unsafe_code)]

//! Visible cells and the per-pass visible list.
//!
//! A [`VisibleList`] is the only structure clicks are resolved against. It
//! holds exactly the cells the last flow pass placed, in placement order,
//! together with the [`LabelSlotIndex`] recording where each group heading
//! landed.
//!
//! # Invariants
//!
//! 1. `cells.len() == positions.len()`; position `i` is the top-left corner
//!    of cell `i`.
//! 2. Every `Some(p)` in the label index points at a `VisibleCell::Label`
//!    for that slot, with `p < cells.len()`.
//! 3. After [`VisibleList::prune`] no entry cell references the pruned
//!    handle.

use rbar_core::geometry::{CellSize, Point, Rect};
use rbar_core::host::Vitals;
use rbar_core::roster::{
    AffiliationGroup, Category, EntityHandle, GroupSlot, NUM_GROUP_SLOTS, RosterEntry,
};
use rbar_core::Rgba;

use crate::flow::ColumnFlow;
use crate::hit;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A status bar for one roster entry, frozen at arrange time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCell {
    pub name: String,
    pub category: Category,
    pub group: AffiliationGroup,
    pub is_leader: bool,
    /// `None` when the member is known but currently unreachable.
    pub live: Option<EntityHandle>,
    pub health_percent: u8,
    pub color: Rgba,
}

impl EntryCell {
    /// Freeze an entry with the vitals read for its live handle.
    ///
    /// An entry whose handle has no vitals (it vanished between rebuild and
    /// render) is shown as unreachable rather than dropped.
    #[must_use]
    pub fn from_entry(entry: &RosterEntry, vitals: Option<Vitals>) -> Self {
        let (live, health_percent, color) = match (entry.live, vitals) {
            (Some(handle), Some(vitals)) => (Some(handle), vitals.health_percent(), entry.color),
            _ => (None, 0, Rgba::UNREACHABLE),
        };
        Self {
            name: entry.name.clone(),
            category: entry.category,
            group: entry.group,
            is_leader: entry.is_leader,
            live,
            health_percent,
            color,
        }
    }

    #[inline]
    pub const fn is_reachable(&self) -> bool {
        self.live.is_some()
    }

    /// Drop the live handle, keeping the bar on screen as unreachable.
    pub fn mark_unreachable(&mut self) {
        self.live = None;
        self.health_percent = 0;
        self.color = Rgba::UNREACHABLE;
    }
}

/// One grid cell of the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleCell {
    Entry(EntryCell),
    /// Heading preceding a group's members.
    Label(GroupSlot),
    /// Placeholder padding a numbered group up to capacity.
    Empty,
}

impl VisibleCell {
    #[inline]
    pub const fn as_entry(&self) -> Option<&EntryCell> {
        match self {
            Self::Entry(entry) => Some(entry),
            _ => None,
        }
    }

    #[inline]
    pub const fn label_slot(&self) -> Option<GroupSlot> {
        match self {
            Self::Label(slot) => Some(*slot),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// LabelSlotIndex
// ---------------------------------------------------------------------------

/// Position of each group heading in the visible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelSlotIndex {
    positions: [Option<usize>; NUM_GROUP_SLOTS],
}

impl LabelSlotIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: [None; NUM_GROUP_SLOTS],
        }
    }

    /// Index every label cell in `cells`.
    #[must_use]
    pub fn from_cells(cells: &[VisibleCell]) -> Self {
        let mut index = Self::new();
        for (position, cell) in cells.iter().enumerate() {
            if let Some(slot) = cell.label_slot() {
                index.record(slot, position);
            }
        }
        index
    }

    pub fn record(&mut self, slot: GroupSlot, position: usize) {
        self.positions[slot.index()] = Some(position);
    }

    /// Where the slot's heading sits, if it is visible.
    #[inline]
    pub fn position(&self, slot: GroupSlot) -> Option<usize> {
        self.positions[slot.index()]
    }

    /// Forget headings at or past `len`.
    pub fn truncate(&mut self, len: usize) {
        for position in &mut self.positions {
            if position.is_some_and(|p| p >= len) {
                *position = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.positions = [None; NUM_GROUP_SLOTS];
    }

    /// The slot whose heading most recently precedes `index`.
    ///
    /// Picks the greatest recorded position `<= index`; on equal positions
    /// the later slot wins.
    #[must_use]
    pub fn owning_slot(&self, index: usize) -> Option<GroupSlot> {
        let mut best: Option<(usize, GroupSlot)> = None;
        for slot in GroupSlot::all() {
            let Some(position) = self.position(slot) else {
                continue;
            };
            if position > index {
                continue;
            }
            if best.is_none_or(|(best_position, _)| position >= best_position) {
                best = Some((position, slot));
            }
        }
        best.map(|(_, slot)| slot)
    }

    /// Affiliation a click at `index` drops into. No preceding heading
    /// means unaffiliated.
    #[must_use]
    pub fn destination(&self, index: usize) -> AffiliationGroup {
        self.owning_slot(index)
            .map_or(AffiliationGroup::Unaffiliated, GroupSlot::affiliation)
    }

    /// Visible slots with their positions, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupSlot, usize)> + '_ {
        GroupSlot::all().filter_map(|slot| self.position(slot).map(|p| (slot, p)))
    }
}

// ---------------------------------------------------------------------------
// VisibleList
// ---------------------------------------------------------------------------

/// Cells placed by one flow pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibleList {
    flow: ColumnFlow,
    cells: Vec<VisibleCell>,
    positions: Vec<Point>,
    labels: LabelSlotIndex,
}

impl VisibleList {
    /// An empty list with no usable geometry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(flow: ColumnFlow, cells: Vec<VisibleCell>, positions: Vec<Point>) -> Self {
        debug_assert_eq!(cells.len(), positions.len());
        let labels = LabelSlotIndex::from_cells(&cells);
        Self {
            flow,
            cells,
            positions,
            labels,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&VisibleCell> {
        self.cells.get(index)
    }

    /// The entry cell at `index`, or `None` for labels, empties and misses.
    #[inline]
    pub fn entry_at(&self, index: usize) -> Option<&EntryCell> {
        self.get(index).and_then(VisibleCell::as_entry)
    }

    #[inline]
    pub fn position(&self, index: usize) -> Option<Point> {
        self.positions.get(index).copied()
    }

    #[inline]
    pub const fn labels(&self) -> &LabelSlotIndex {
        &self.labels
    }

    #[inline]
    pub const fn flow(&self) -> &ColumnFlow {
        &self.flow
    }

    #[inline]
    pub fn viewport(&self) -> Rect {
        self.flow.viewport()
    }

    #[inline]
    pub fn cell_size(&self) -> CellSize {
        self.flow.cell()
    }

    pub fn cells(&self) -> &[VisibleCell] {
        &self.cells
    }

    /// Cells paired with their top-left corners, in placement order.
    pub fn iter_placed(&self) -> impl Iterator<Item = (Point, &VisibleCell)> {
        self.positions.iter().copied().zip(self.cells.iter())
    }

    /// Resolve a screen point to a cell index using this list's geometry.
    #[must_use]
    pub fn locate(&self, point: Point) -> Option<usize> {
        hit::locate(
            point,
            self.flow.viewport(),
            self.flow.cell(),
            self.cells.len(),
            self.flow.rows_per_column(),
        )
    }

    /// Null every reference to `handle`. Returns how many cells changed.
    pub fn prune(&mut self, handle: EntityHandle) -> usize {
        let mut pruned = 0;
        for cell in &mut self.cells {
            if let VisibleCell::Entry(entry) = cell
                && entry.live == Some(handle)
            {
                entry.mark_unreachable();
                pruned += 1;
            }
        }
        pruned
    }

    /// Whether any entry cell still holds `handle`.
    #[must_use]
    pub fn references(&self, handle: EntityHandle) -> bool {
        self.cells
            .iter()
            .filter_map(VisibleCell::as_entry)
            .any(|entry| entry.live == Some(handle))
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.positions.clear();
        self.labels.clear();
    }
}
