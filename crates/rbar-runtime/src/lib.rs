#![forbid(unsafe_code)]

//! RaidBars Runtime
//!
//! Drives the overlay from host events: caches the roster snapshot, runs
//! layout each render pass, interprets management gestures and applies
//! `/raidbars` subcommands.
//!
//! # Key Components
//!
//! - [`RaidBars`] - Composition root and host entry points
//! - [`SnapshotCache`] - Per-category roster snapshot with despawn sweeps
//! - [`ManagementStateMachine`] - Modifier-click roster reorganization
//! - [`OverlaySettings`] - Observable runtime settings
//! - [`OverlayConfig`] - TOML-loadable initial settings
//! - [`command::parse`] - The subcommand parser
//!
//! # Role in raidbars
//! `rbar-runtime` is the orchestrator. It consumes host facts through the
//! collaborator traits in `rbar-core`, hands roster buckets to
//! `rbar-layout`, and sends the resulting draw calls and roster intents
//! back to the host.

pub mod command;
pub mod error;
pub mod manage;
pub mod overlay;
pub mod reactive;
pub mod settings;
pub mod snapshot;

pub use command::{Subcommand, Switch};
pub use error::{ConfigError, UsageError};
pub use manage::{ClickOutcome, ManagementStateMachine, RosterCommand, VisibleListView};
pub use overlay::{OverlayHost, RaidBars, RosterWorld};
pub use reactive::{Observable, Subscription};
pub use settings::{OverlayConfig, OverlaySettings, PositionConfig, Setting};
pub use snapshot::SnapshotCache;
