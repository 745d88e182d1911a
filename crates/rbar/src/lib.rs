#![forbid(unsafe_code)]

//! raidbars public facade crate.
//!
//! Re-exports the types a host needs to embed the overlay, plus a prelude
//! for the common case:
//!
//! ```ignore
//! use rbar::prelude::*;
//!
//! let mut bars = RaidBars::new(&OverlayConfig::default(), OverlayHost {
//!     world: Box::new(world),
//!     render: Box::new(render),
//!     commands: Box::new(commands),
//!     status: Box::new(status),
//! });
//! bars.handle_event(HostEvent::RenderTick { now_ms });
//! ```

// --- Core re-exports -------------------------------------------------------

pub use rbar_core::category::{CategoryPriorityOrder, CategorySet, VisibilityFlags};
pub use rbar_core::color::Rgba;
pub use rbar_core::event::{ClickEvent, Gesture, HostEvent, Modifiers, MouseButton};
pub use rbar_core::geometry::{CellSize, Point, Rect, Size};
pub use rbar_core::host::{
    CommandChannel, FontError, LiveEntityResolver, RenderHost, RenderSink, RosterSource,
    StatusSink, TextSize, Vitals,
};
pub use rbar_core::roster::{
    AffiliationGroup, Category, EntityHandle, GroupNumber, GroupSlot, RosterEntry, RosterMember,
};

// --- Layout re-exports -----------------------------------------------------

pub use rbar_layout::{BarMetrics, ColumnFlow, GridError, VisibleCell, VisibleList};

// --- Runtime re-exports ----------------------------------------------------

pub use rbar_runtime::{
    ConfigError, ManagementStateMachine, OverlayConfig, OverlayHost, OverlaySettings, RaidBars,
    RosterWorld, Setting, SnapshotCache, Subcommand, UsageError,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Category, ClickEvent, CommandChannel, HostEvent, LiveEntityResolver, Modifiers,
        OverlayConfig, OverlayHost, RaidBars, RenderHost, RenderSink, RosterMember, RosterSource,
        StatusSink,
    };

    pub use crate::{core, layout, runtime};
}

pub use rbar_core as core;
pub use rbar_layout as layout;
pub use rbar_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::AffiliationGroup;
    use crate::core::testing::{FakeRenderHost, FakeWorld, RecordingCommands, RecordingStatus};

    #[test]
    fn prelude_is_enough_to_drive_the_overlay() {
        let world = FakeWorld::new();
        world.add_live_member(RosterMember::new(
            "Anna",
            Category::Enchanter,
            AffiliationGroup::Unaffiliated,
        ));
        let render = FakeRenderHost::new(640, 480);
        let config = OverlayConfig {
            enabled: true,
            show_all: true,
            ..OverlayConfig::default()
        };
        let mut bars = RaidBars::new(
            &config,
            OverlayHost {
                world: Box::new(world),
                render: Box::new(render.clone()),
                commands: Box::new(RecordingCommands::default()),
                status: Box::new(RecordingStatus::default()),
            },
        );
        bars.handle_event(HostEvent::RenderTick { now_ms: 0 });
        assert_eq!(render.last_frame_names(), ["Anna"]);
    }
}
