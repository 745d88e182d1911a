#![forbid(unsafe_code)]

//! Canonical input and host event types.
//!
//! The host forwards mouse clicks as [`ClickEvent`] values before running its
//! own click handling, and delivers lifecycle notifications as [`HostEvent`]
//! values on the render thread.
//!
//! # Design Notes
//!
//! - `Modifiers` use bitflags for easy combination.
//! - A [`Gesture`] is recognized only when exactly one of Shift, Alt or Ctrl
//!   is held. Any other combination is left to the host.

use bitflags::bitflags;

use crate::geometry::Point;
use crate::roster::EntityHandle;

bitflags! {
    /// Modifier keys that can be held during a click.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left mouse button.
    #[default]
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// A mouse click as seen by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Screen position of the release.
    pub position: Point,
    /// The button that was released.
    pub button: MouseButton,
    /// Modifier keys held during the click.
    pub modifiers: Modifiers,
}

impl ClickEvent {
    /// Create a left click with no modifiers.
    #[must_use]
    pub const fn left(x: i32, y: i32) -> Self {
        Self {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a click with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The management gesture this click encodes, if any.
    #[must_use]
    pub fn gesture(&self) -> Option<Gesture> {
        Gesture::from_modifiers(self.modifiers)
    }
}

/// Roster management gestures, keyed by a single held modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Alt+Click: move the member out of its group.
    Demote,
    /// Shift+Click: make the member a group leader.
    Promote,
    /// Ctrl+Click: select a member, then Ctrl+Click its destination group.
    Select,
}

impl Gesture {
    /// Map a modifier state to a gesture. Returns `None` when no modifier or
    /// more than one of Shift/Alt/Ctrl is held.
    #[must_use]
    pub fn from_modifiers(modifiers: Modifiers) -> Option<Self> {
        let relevant = modifiers & (Modifiers::SHIFT | Modifiers::ALT | Modifiers::CTRL);
        if relevant == Modifiers::ALT {
            Some(Self::Demote)
        } else if relevant == Modifiers::SHIFT {
            Some(Self::Promote)
        } else if relevant == Modifiers::CTRL {
            Some(Self::Select)
        } else {
            None
        }
    }

    /// Key combination shown in help text.
    #[must_use]
    pub const fn binding(self) -> &'static str {
        match self {
            Self::Demote => "Alt+Click",
            Self::Promote => "Shift+Click",
            Self::Select => "Ctrl+Click",
        }
    }
}

/// Notifications the host delivers on the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Per-frame UI render callback, stamped with the host's game clock.
    RenderTick { now_ms: u64 },
    /// The roster changed on the wire; rebuild on the next pass.
    RosterChanged,
    /// A live entity is about to be destroyed.
    Despawn(EntityHandle),
    /// The player is changing zones.
    ZoneTransition,
    /// The host is tearing down its UI.
    UiCleanup,
    /// The rendering device was reset or released.
    DeviceReset,
}
