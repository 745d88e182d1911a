#![forbid(unsafe_code)]

//! Core: geometry, input events, the roster data model, and host seams.
//!
//! # Role in raidbars
//! `rbar-core` is the vocabulary layer. It owns the pixel geometry used by
//! layout and hit testing, the modifier-aware click events the host forwards,
//! the roster types (categories, affiliation groups, entries), and the
//! collaborator traits through which the overlay reaches the host: roster
//! membership, live entity lookup, rendering, commands and status output.
//!
//! # How it fits in the system
//! `rbar-layout` places roster entries on screen using these types, and
//! `rbar-runtime` drives everything from host events. Nothing in this crate
//! holds state across frames.

pub mod category;
pub mod color;
pub mod event;
pub mod geometry;
pub mod host;
pub mod roster;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use category::{CategoryPriorityOrder, CategorySet, VisibilityFlags};
pub use color::Rgba;
pub use event::{ClickEvent, Gesture, HostEvent, Modifiers, MouseButton};
pub use geometry::{CellSize, Point, Rect, Size};
pub use roster::{
    AffiliationGroup, Category, CategoryBuckets, EntityHandle, GroupNumber, GroupSlot, RosterEntry,
    RosterMember,
};
