#![forbid(unsafe_code)]

//! Roster management gestures.
//!
//! Modified clicks on the overlay reorganize the roster:
//!
//! | Gesture      | On an entry                                           |
//! |--------------|-------------------------------------------------------|
//! | Alt+Click    | move to ungrouped                                     |
//! | Shift+Click  | ungrouped: move to the first empty group; else promote |
//! | Ctrl+Click   | select; a second Ctrl+Click picks the destination     |
//!
//! # States
//!
//! ```text
//!            Ctrl on entry                     Ctrl on any cell
//!   Idle ─────────────────────▶ Selecting ─────────────────────▶ Idle
//!    ▲                              │
//!    └──────── Alt / Shift ─────────┘
//! ```
//!
//! Turning management off forces `Idle`. The machine never talks to the
//! host directly: it returns a [`ClickOutcome`] and the caller sends the
//! command and prints the messages.

use std::fmt;

use tracing::{debug, info};

use rbar_core::event::Gesture;
use rbar_core::host::{CommandChannel, LiveEntityResolver};
use rbar_core::roster::{AffiliationGroup, GROUP_CAPACITY, GroupNumber};
use rbar_layout::{EntryCell, LabelSlotIndex, VisibleList};

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// What the state machine may see of the last layout pass.
pub trait VisibleListView {
    fn visible_len(&self) -> usize;

    /// The entry at `index`; `None` for labels, empty slots and misses.
    fn entry_at(&self, index: usize) -> Option<&EntryCell>;

    fn label_slots(&self) -> &LabelSlotIndex;
}

impl VisibleListView for VisibleList {
    fn visible_len(&self) -> usize {
        self.len()
    }

    fn entry_at(&self, index: usize) -> Option<&EntryCell> {
        VisibleList::entry_at(self, index)
    }

    fn label_slots(&self) -> &LabelSlotIndex {
        self.labels()
    }
}

// ---------------------------------------------------------------------------
// Commands and outcomes
// ---------------------------------------------------------------------------

/// A reorganize intent for the command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterCommand {
    Move { name: String, to: AffiliationGroup },
    Promote { name: String },
}

impl RosterCommand {
    pub fn send(&self, channel: &mut dyn CommandChannel) {
        match self {
            Self::Move { name, to } => channel.send_move(name, to.command_value()),
            Self::Promote { name } => channel.send_promote(name),
        }
    }
}

impl fmt::Display for RosterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { name, to } => write!(f, "move {name} to {to}"),
            Self::Promote { name } => write!(f, "promote {name}"),
        }
    }
}

/// Result of one click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// The click belonged to the overlay; suppress default handling.
    pub handled: bool,
    pub command: Option<RosterCommand>,
    pub messages: Vec<String>,
}

impl ClickOutcome {
    #[must_use]
    pub fn unhandled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    fn message(mut self, message: String) -> Self {
        self.messages.push(message);
        self
    }

    fn command(mut self, command: RosterCommand) -> Self {
        self.command = Some(command);
        self
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Management mode and the pending two-click selection.
#[derive(Debug, Clone)]
pub struct ManagementStateMachine {
    enabled: bool,
    pending: Option<String>,
    group_capacity: usize,
}

impl Default for ManagementStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagementStateMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: false,
            pending: None,
            group_capacity: GROUP_CAPACITY,
        }
    }

    /// Members a numbered group holds before moves into it are refused.
    #[must_use]
    pub const fn with_group_capacity(mut self, capacity: usize) -> Self {
        self.group_capacity = capacity;
        self
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch management mode. Always drops any pending selection.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(enabled, "management mode changed");
        }
        self.enabled = enabled;
        self.pending = None;
    }

    /// Drop the pending selection without changing the mode.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    #[inline]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    #[inline]
    pub const fn is_selecting(&self) -> bool {
        self.pending.is_some()
    }

    /// Interpret a gesture click at visible-list `index`.
    ///
    /// Unhandled while management is off or nothing is visible.
    pub fn handle_click(
        &mut self,
        index: usize,
        gesture: Gesture,
        view: &dyn VisibleListView,
        groups: &dyn LiveEntityResolver,
    ) -> ClickOutcome {
        if !self.enabled || view.visible_len() == 0 || index >= view.visible_len() {
            return ClickOutcome::unhandled();
        }
        debug!(index, ?gesture, selecting = self.is_selecting(), "management click");
        match gesture {
            Gesture::Demote => self.demote(index, view, groups),
            Gesture::Promote => self.promote(index, view, groups),
            Gesture::Select => match self.pending.take() {
                None => self.select(index, view),
                Some(name) => self.place(name, index, view, groups),
            },
        }
    }

    fn demote(
        &mut self,
        index: usize,
        view: &dyn VisibleListView,
        groups: &dyn LiveEntityResolver,
    ) -> ClickOutcome {
        self.pending = None;
        let Some(entry) = view.entry_at(index) else {
            return ClickOutcome::handled();
        };
        let name = entry.name.clone();
        let group = groups.group_of(&name).unwrap_or(entry.group);
        if group.is_unaffiliated() {
            return ClickOutcome::handled().message(format!("Player {name} is already ungrouped."));
        }
        ClickOutcome::handled()
            .message(format!("Kicking {name} to ungrouped."))
            .command(RosterCommand::Move {
                name,
                to: AffiliationGroup::Unaffiliated,
            })
    }

    fn promote(
        &mut self,
        index: usize,
        view: &dyn VisibleListView,
        groups: &dyn LiveEntityResolver,
    ) -> ClickOutcome {
        self.pending = None;
        let Some(entry) = view.entry_at(index) else {
            return ClickOutcome::handled();
        };
        let name = entry.name.clone();
        let group = groups.group_of(&name).unwrap_or(entry.group);
        if !group.is_unaffiliated() {
            return ClickOutcome::handled()
                .message(format!("Promoting {name} to group leader."))
                .command(RosterCommand::Promote { name });
        }

        match GroupNumber::all().find(|&group| groups.member_count_of(group) == 0) {
            Some(empty) => ClickOutcome::handled()
                .message(format!("Moving {name} to group {empty}."))
                .command(RosterCommand::Move {
                    name,
                    to: AffiliationGroup::Numbered(empty),
                }),
            None => ClickOutcome::handled()
                .message(format!("No empty groups available to move {name} into.")),
        }
    }

    fn select(&mut self, index: usize, view: &dyn VisibleListView) -> ClickOutcome {
        let Some(entry) = view.entry_at(index) else {
            return ClickOutcome::handled();
        };
        let name = entry.name.clone();
        debug!(%name, "selection pending");
        let outcome = ClickOutcome::handled().message(format!(
            "Selected {name} for move. {} a destination group.",
            Gesture::Select.binding()
        ));
        self.pending = Some(name);
        outcome
    }

    fn place(
        &mut self,
        name: String,
        index: usize,
        view: &dyn VisibleListView,
        groups: &dyn LiveEntityResolver,
    ) -> ClickOutcome {
        self.pending = None;
        match view.label_slots().destination(index) {
            AffiliationGroup::Unaffiliated => ClickOutcome::handled()
                .message(format!("Moving {name} to ungrouped."))
                .command(RosterCommand::Move {
                    name,
                    to: AffiliationGroup::Unaffiliated,
                }),
            AffiliationGroup::Numbered(group) => {
                if groups.member_count_of(group) >= self.group_capacity {
                    return ClickOutcome::handled()
                        .message(format!("Group {group} is full. Cannot move {name}."));
                }
                ClickOutcome::handled()
                    .message(format!("Moving {name} to group {group}."))
                    .command(RosterCommand::Move {
                        name,
                        to: AffiliationGroup::Numbered(group),
                    })
            }
        }
    }
}
