#![forbid(unsafe_code)]

//! Layout primitives: visible cells, column flow, and hit testing.
//!
//! # Pipeline
//!
//! 1. An arrange pass ([`arrange::by_category`] or [`arrange::by_group`])
//!    turns roster buckets into an ordered list of [`VisibleCell`]s.
//! 2. [`flow()`] places those cells column-major into the viewport, drops
//!    whatever does not fit, and indexes the group labels that survived,
//!    producing the [`VisibleList`].
//! 3. [`hit::locate`] maps a screen point back to an index in that list.
//!
//! Steps 2 and 3 are exact inverses for the same viewport and cell size.

pub mod arrange;
pub mod cell;
pub mod flow;
pub mod hit;
pub mod sizing;

pub use arrange::ArrangeContext;
pub use cell::{EntryCell, LabelSlotIndex, VisibleCell, VisibleList};
pub use flow::{ColumnFlow, flow};
pub use hit::locate;
pub use sizing::{BarMetrics, GridError, GridPlan, grid_request};
