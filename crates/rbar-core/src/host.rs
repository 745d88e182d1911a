#![forbid(unsafe_code)]

//! Collaborator traits implemented by the host application.
//!
//! The overlay never reaches into host globals. Everything it needs arrives
//! through one of these narrow seams, handed to the composition root at
//! construction:
//!
//! | Trait                  | Provides |
//! |------------------------|----------|
//! | [`RosterSource`]       | Roster membership and group capacity |
//! | [`LiveEntityResolver`] | Name → live handle, vitals, group queries |
//! | [`RenderHost`]         | Screen size, UI visibility, font loading |
//! | [`RenderSink`]         | A loaded font: measuring and draw queues |
//! | [`CommandChannel`]     | Outgoing reorganize and target intents |
//! | [`StatusSink`]         | Operator-visible status lines |
//!
//! All calls happen on the host's render thread.

use thiserror::Error;

use crate::color::Rgba;
use crate::geometry::{Point, Rect, Size};
use crate::roster::{AffiliationGroup, Category, EntityHandle, GROUP_CAPACITY, GroupNumber, RosterMember};

/// Current and maximum hit points of a live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vitals {
    pub current: i32,
    pub max: i32,
}

impl Vitals {
    #[inline]
    pub const fn new(current: i32, max: i32) -> Self {
        Self { current, max }
    }

    /// `floor(current * 100 / max)` when both are positive, else 0.
    #[must_use]
    pub const fn health_percent(self) -> u8 {
        if self.current <= 0 || self.max <= 0 {
            return 0;
        }
        let percent = self.current as i64 * 100 / self.max as i64;
        if percent > u8::MAX as i64 {
            u8::MAX
        } else {
            percent as u8
        }
    }
}

/// Measured extent of a string in the active font.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

impl TextSize {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Font loading failures reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    #[error("font {name} not found")]
    NotFound { name: String },

    #[error("rendering device unavailable")]
    NoDevice,

    #[error("font {name} failed to load: {details}")]
    Load { name: String, details: String },
}

/// Supplies the current roster.
pub trait RosterSource {
    /// `false` means there is no roster; the snapshot is treated as empty.
    fn is_active(&self) -> bool;

    /// Current membership. Slots with empty names are skipped by the caller.
    fn members(&self) -> Vec<RosterMember>;

    /// Members allowed per numbered group.
    fn capacity_per_group(&self) -> usize {
        GROUP_CAPACITY
    }

    /// Bar color for a category.
    fn category_color(&self, category: Category) -> Rgba {
        category.default_color()
    }
}

/// Looks up live in-world objects and authoritative group membership.
pub trait LiveEntityResolver {
    /// Live handle for a roster name, if the object is currently reachable.
    fn resolve(&self, name: &str) -> Option<EntityHandle>;

    /// Whether the handle refers to a participant (not a corpse or pet).
    fn is_participant(&self, handle: EntityHandle) -> bool;

    /// Hit points of a live object, if it still exists.
    fn vitals(&self, handle: EntityHandle) -> Option<Vitals>;

    /// Handle of the operator's own character.
    fn self_handle(&self) -> Option<EntityHandle>;

    /// Current affiliation of a roster member; `None` if not on the roster.
    fn group_of(&self, name: &str) -> Option<AffiliationGroup>;

    /// Members currently in a numbered group.
    fn member_count_of(&self, group: GroupNumber) -> usize;
}

/// A loaded font plus its draw queue. Dropping it releases host resources.
pub trait RenderSink {
    /// Extent of a single-line string.
    fn measure(&self, text: &str) -> TextSize;

    /// Distance between two text baselines.
    fn line_spacing(&self) -> f32;

    /// Size of the health bar drawn under each name.
    fn set_bar_size(&mut self, width: f32, height: f32);

    /// Queue plain text.
    fn queue_text(&mut self, text: &str, position: Point, color: Rgba);

    /// Queue a name with a health bar filled to `health_percent` below it.
    fn queue_status_bar(&mut self, name: &str, position: Point, health_percent: u8, color: Rgba);

    /// Queue a filled rectangle drawn behind everything else.
    fn queue_background_rect(&mut self, rect: Rect, color: Rgba);

    /// Draw everything queued since the last flush.
    fn flush(&mut self);
}

/// Rendering environment of the host.
pub trait RenderHost {
    /// Full-screen resolution in pixels.
    fn screen_size(&self) -> Size;

    /// Whether the host UI is currently shown.
    fn is_ui_visible(&self) -> bool {
        true
    }

    /// Load a font by name.
    fn load_font(&mut self, name: &str) -> Result<Box<dyn RenderSink>, FontError>;

    /// Names accepted by [`RenderHost::load_font`].
    fn available_fonts(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Outgoing intents.
pub trait CommandChannel {
    /// Move a member to a group (`1..=12`) or out of all groups (`0`).
    fn send_move(&mut self, name: &str, group_or_zero: u8);

    /// Make an affiliated member the leader of its group.
    fn send_promote(&mut self, name: &str);

    /// Select a live entity as the host's current target.
    fn set_target(&mut self, handle: EntityHandle);
}

/// Operator-visible status output.
pub trait StatusSink {
    fn print(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_percent_floors() {
        assert_eq!(Vitals::new(50, 100).health_percent(), 50);
        assert_eq!(Vitals::new(2, 3).health_percent(), 66);
        assert_eq!(Vitals::new(100, 100).health_percent(), 100);
    }

    #[test]
    fn health_percent_zero_when_not_positive() {
        assert_eq!(Vitals::new(0, 100).health_percent(), 0);
        assert_eq!(Vitals::new(-5, 100).health_percent(), 0);
        assert_eq!(Vitals::new(10, 0).health_percent(), 0);
    }

    #[test]
    fn health_percent_large_values_do_not_overflow() {
        assert_eq!(Vitals::new(i32::MAX, i32::MAX).health_percent(), 100);
    }

    #[test]
    fn font_error_messages() {
        let err = FontError::NotFound {
            name: "arial_10".into(),
        };
        assert_eq!(err.to_string(), "font arial_10 not found");
    }
}
