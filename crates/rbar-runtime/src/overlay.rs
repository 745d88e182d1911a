#![forbid(unsafe_code)]

//! The `RaidBars` overlay: composition root and host entry points.
//!
//! `RaidBars` owns every piece of overlay state and the host collaborators
//! it was built with. The host drives it through four entry points:
//!
//! | Entry point                    | When |
//! |--------------------------------|------|
//! | [`RaidBars::handle_event`]     | render ticks and lifecycle notifications |
//! | [`RaidBars::on_click`]         | before the host's own click handling |
//! | [`RaidBars::command`]          | `/raidbars` subcommand text |
//! | [`RaidBars::clean`]            | explicit teardown |
//!
//! # Render pass
//!
//! ```text
//! enabled? ─▶ roster active? ─▶ UI visible? ─▶ font ─▶ rebuild if due
//!          ─▶ viewport ─▶ background ─▶ arrange ─▶ flow ─▶ draw ─▶ flush
//! ```
//!
//! # Invariants
//!
//! 1. The font is owned here and dropped by [`RaidBars::clean`], which runs
//!    on zone transitions, UI cleanup, device resets and an inactive roster.
//!    Disabling the overlay or changing the font or bar size releases it from
//!    the setting's subscriber, before `set` returns.
//! 2. Clicks are resolved against the visible list of the last render pass.
//! 3. A despawn sweep completes before `handle_event` returns.
//!
//! # Failure Modes
//!
//! - Custom font fails to load: the font setting falls back to `Default`
//!   and the next pass retries.
//! - Default font fails to load: the overlay disables itself.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, debug_span, info, warn};

use rbar_core::category::CategorySet;
use rbar_core::color::Rgba;
use rbar_core::event::{ClickEvent, HostEvent, MouseButton};
use rbar_core::geometry::{CellSize, Point, Rect};
use rbar_core::host::{
    CommandChannel, LiveEntityResolver, RenderHost, RenderSink, RosterSource, StatusSink,
};
use rbar_layout::sizing::SAMPLE_NAME;
use rbar_layout::{ArrangeContext, BarMetrics, VisibleCell, VisibleList, arrange, flow, grid_request};

use crate::command::{self, ClassListKind, Subcommand, usage};
use crate::error::UsageError;
use crate::manage::ManagementStateMachine;
use crate::reactive::Subscription;
use crate::settings::{OverlayConfig, OverlaySettings, Setting, USE_DEFAULT_FONT};
use crate::snapshot::SnapshotCache;

/// Pixels between a label's baseline area and the bottom of its cell.
const LABEL_BOTTOM_MARGIN: f32 = 2.0;
const EMPTY_SLOT_TEXT: &str = "Empty";

// ---------------------------------------------------------------------------
// Host bundle
// ---------------------------------------------------------------------------

/// Roster membership and live-entity lookup, usually one host object.
pub trait RosterWorld: RosterSource + LiveEntityResolver {
    fn as_roster(&self) -> &dyn RosterSource;
    fn as_resolver(&self) -> &dyn LiveEntityResolver;
}

impl<T: RosterSource + LiveEntityResolver> RosterWorld for T {
    fn as_roster(&self) -> &dyn RosterSource {
        self
    }

    fn as_resolver(&self) -> &dyn LiveEntityResolver {
        self
    }
}

/// The host collaborators handed to [`RaidBars::new`].
pub struct OverlayHost {
    pub world: Box<dyn RosterWorld>,
    pub render: Box<dyn RenderHost>,
    pub commands: Box<dyn CommandChannel>,
    pub status: Box<dyn StatusSink>,
}

// ---------------------------------------------------------------------------
// RaidBars
// ---------------------------------------------------------------------------

/// Everything [`RaidBars::clean`] drops, shared with the setting subscribers.
struct OverlayState {
    snapshot: SnapshotCache,
    manage: ManagementStateMachine,
    font: Option<Box<dyn RenderSink>>,
    metrics: Option<BarMetrics>,
    visible: VisibleList,
}

impl OverlayState {
    fn release(&mut self) {
        if self.font.take().is_some() {
            debug!("font released");
        }
        self.metrics = None;
        self.visible.clear();
        self.snapshot.clear();
        self.manage.reset();
    }
}

/// Subscriber side of a release-on-change setting.
#[derive(Clone)]
struct Releaser {
    state: Rc<RefCell<OverlayState>>,
    /// Set when a change lands while the state is borrowed; `settle` finishes it.
    deferred: Rc<Cell<bool>>,
}

impl Releaser {
    fn run(&self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.release(),
            Err(_) => self.deferred.set(true),
        }
    }
}

/// The raid roster overlay.
pub struct RaidBars {
    settings: OverlaySettings,
    state: Rc<RefCell<OverlayState>>,
    deferred_clean: Rc<Cell<bool>>,
    _subscriptions: Vec<Subscription>,
    world: Box<dyn RosterWorld>,
    render: Box<dyn RenderHost>,
    commands: Box<dyn CommandChannel>,
    status: Box<dyn StatusSink>,
}

impl RaidBars {
    #[must_use]
    pub fn new(config: &OverlayConfig, host: OverlayHost) -> Self {
        let settings = OverlaySettings::from_config(config);
        let manage =
            ManagementStateMachine::new().with_group_capacity(host.world.capacity_per_group());
        let state = Rc::new(RefCell::new(OverlayState {
            snapshot: SnapshotCache::new(),
            manage,
            font: None,
            metrics: None,
            visible: VisibleList::empty(),
        }));
        let releaser = Releaser {
            state: Rc::clone(&state),
            deferred: Rc::new(Cell::new(false)),
        };

        let mut subscriptions = Vec::with_capacity(4);
        let on_disable = releaser.clone();
        subscriptions.push(settings.enabled.subscribe(move |on| {
            if !*on {
                on_disable.run();
            }
        }));
        subscriptions.push(release_on_change(&settings.font, &releaser));
        subscriptions.push(release_on_change(&settings.bar_width, &releaser));
        subscriptions.push(release_on_change(&settings.bar_height, &releaser));

        Self {
            settings,
            state,
            deferred_clean: releaser.deferred,
            _subscriptions: subscriptions,
            world: host.world,
            render: host.render,
            commands: host.commands,
            status: host.status,
        }
    }

    #[inline]
    pub const fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Current settings as a config, for the host to persist.
    #[must_use]
    pub fn export_config(&self) -> OverlayConfig {
        self.settings.export()
    }

    /// Cells placed by the last render pass. Drop the guard before calling
    /// back into the overlay.
    pub fn visible(&self) -> Ref<'_, VisibleList> {
        Ref::map(self.state.borrow(), |state| &state.visible)
    }

    pub fn snapshot(&self) -> Ref<'_, SnapshotCache> {
        Ref::map(self.state.borrow(), |state| &state.snapshot)
    }

    pub fn management(&self) -> Ref<'_, ManagementStateMachine> {
        Ref::map(self.state.borrow(), |state| &state.manage)
    }

    #[must_use]
    pub fn is_font_loaded(&self) -> bool {
        self.state.borrow().font.is_some()
    }

    #[must_use]
    pub fn metrics(&self) -> Option<BarMetrics> {
        self.state.borrow().metrics
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Dispatch a host notification.
    pub fn handle_event(&mut self, event: HostEvent) {
        self.settle();
        match event {
            HostEvent::RenderTick { now_ms } => self.render_pass(now_ms),
            HostEvent::RosterChanged => self.state.borrow_mut().snapshot.mark_dirty(),
            HostEvent::Despawn(handle) => {
                // The world may already have dropped the handle, so sweep
                // without asking it.
                if self.settings.enabled.get() {
                    let mut state = self.state.borrow_mut();
                    let OverlayState {
                        snapshot, visible, ..
                    } = &mut *state;
                    snapshot.on_despawn(handle, visible);
                }
            }
            HostEvent::ZoneTransition | HostEvent::UiCleanup | HostEvent::DeviceReset => {
                debug!(?event, "releasing overlay resources");
                self.clean();
            }
        }
        self.settle();
    }

    /// Offer a click to the overlay. Returns `true` when the overlay
    /// consumed it and the host should skip its own handling.
    pub fn on_click(&mut self, click: ClickEvent) -> bool {
        self.settle();
        if click.button != MouseButton::Left
            || !self.settings.enabled.get()
            || !self.settings.clickable.get()
        {
            return false;
        }
        let mut state = self.state.borrow_mut();
        let OverlayState { manage, visible, .. } = &mut *state;
        if visible.is_empty() {
            return false;
        }
        let Some(index) = visible.locate(click.position) else {
            return false;
        };

        if let Some(gesture) = click.gesture() {
            let outcome = manage.handle_click(index, gesture, visible, self.world.as_resolver());
            for message in &outcome.messages {
                self.status.print(message);
            }
            if let Some(command) = &outcome.command {
                info!(%command, "roster command");
                command.send(self.commands.as_mut());
            }
            if outcome.handled {
                return true;
            }
        }

        match visible.entry_at(index).and_then(|entry| entry.live) {
            Some(handle) => {
                debug!(index, handle = handle.0, "target");
                self.commands.set_target(handle);
                true
            }
            None => false,
        }
    }

    /// Run a `/raidbars` subcommand, given its arguments.
    pub fn command<S: AsRef<str>>(&mut self, args: &[S]) {
        let result = command::parse(args).and_then(|subcommand| self.apply(subcommand));
        if let Err(err) = result {
            self.report_usage(&err);
        }
        self.settle();
    }

    /// Release the font and drop every cached view of the roster.
    pub fn clean(&mut self) {
        self.deferred_clean.set(false);
        self.state.borrow_mut().release();
    }

    fn settle(&mut self) {
        if self.deferred_clean.get() {
            self.clean();
        }
    }

    // -----------------------------------------------------------------------
    // Render pass
    // -----------------------------------------------------------------------

    fn render_pass(&mut self, now_ms: u64) {
        if !self.settings.enabled.get() {
            return;
        }
        if !self.world.is_active() {
            if self.is_font_loaded() {
                self.clean();
            }
            return;
        }
        if !self.render.is_ui_visible() {
            return;
        }
        let Some(metrics) = self.ensure_font() else {
            return;
        };

        let span = debug_span!("raidbars.render", now_ms, placed = tracing::field::Empty);
        let _guard = span.enter();

        let viewport = self.viewport();
        let mut state = self.state.borrow_mut();
        let OverlayState {
            snapshot,
            font,
            visible,
            ..
        } = &mut *state;
        if snapshot.is_due_for_rebuild(now_ms) {
            snapshot.rebuild(now_ms, self.world.as_roster(), self.world.as_resolver());
        }

        *visible = self.layout(snapshot, viewport, metrics.cell);
        span.record("placed", visible.len());

        let Some(font) = font.as_mut() else {
            return;
        };
        let alpha = self.settings.background_alpha.get();
        if alpha > 0 {
            font.queue_background_rect(viewport, Rgba::black_with_opacity(alpha));
        }
        draw(&mut **font, visible);
        font.flush();
    }

    /// Load the font if needed and return its metrics.
    ///
    /// Never holds the state borrow across a setting change, since the
    /// fallback paths below notify the release subscribers.
    fn ensure_font(&mut self) -> Option<BarMetrics> {
        {
            let state = self.state.borrow();
            if state.font.is_some() {
                return state.metrics;
            }
        }

        let (name, is_default) = self.settings.resolved_font();
        match self.render.load_font(&name) {
            Ok(mut font) => {
                let metrics = BarMetrics::derive(
                    font.measure(SAMPLE_NAME),
                    self.settings.bar_width.get(),
                    self.settings.bar_height.get(),
                );
                font.set_bar_size(metrics.bar_width, metrics.bar_height);
                debug!(font = %name, cell = ?metrics.cell, "font loaded");
                let mut state = self.state.borrow_mut();
                state.font = Some(font);
                state.metrics = Some(metrics);
                Some(metrics)
            }
            Err(err) => {
                warn!(font = %name, %err, "font load failed");
                self.status.print(&format!("Failed to load font: {name}"));
                if is_default {
                    self.status.print("Disabling raidbars due to font issue");
                    self.settings.enabled.set(false);
                } else {
                    self.settings.font.set(USE_DEFAULT_FONT.to_owned());
                }
                None
            }
        }
    }

    /// Viewport from the position settings. A right or bottom edge of 0, or
    /// one not past left or top, stretches to the screen edge.
    fn viewport(&self) -> Rect {
        let screen = self.render.screen_size();
        let left = self.settings.left.get();
        let top = self.settings.top.get();
        let mut right = self.settings.right.get();
        let mut bottom = self.settings.bottom.get();
        if right <= left {
            right = screen.width;
        }
        if bottom <= top {
            bottom = screen.height;
        }
        Rect::from_edges(left, top, right, bottom)
    }

    fn layout(&self, snapshot: &SnapshotCache, viewport: Rect, cell: CellSize) -> VisibleList {
        let priority = self.settings.priority();
        let flags = self.settings.visibility();
        let resolver = self.world.as_resolver();
        let ctx = ArrangeContext {
            priority: &priority,
            flags: &flags,
            show_all: self.settings.show_all.get(),
            threshold: self.settings.threshold.get(),
            self_handle: resolver.self_handle(),
            resolver,
        };
        let cells = if self.settings.group_sort.get() {
            arrange::by_group(snapshot.buckets(), &ctx)
        } else {
            arrange::by_category(snapshot.buckets(), &ctx)
        };
        flow(cells, viewport, cell)
    }

    // -----------------------------------------------------------------------
    // Subcommands
    // -----------------------------------------------------------------------

    fn apply(&mut self, subcommand: Subcommand) -> Result<(), UsageError> {
        match subcommand {
            Subcommand::Enable(switch) => {
                let on = switch.apply(self.settings.enabled.get());
                self.settings.enabled.set(on);
                self.print(format!("Raidbars are {}", on_off(on)));
            }
            Subcommand::Manage(None) => {
                let on = self.state.borrow().manage.is_enabled();
                self.print(format!("Raidbars manage mode is {}", on_off(on)));
                self.print(usage::MANAGE);
            }
            Subcommand::Manage(Some(true)) => {
                self.settings.group_sort.set(true);
                self.settings.clickable.set(true);
                self.settings.show_all.set(true);
                self.settings.enabled.set(true);
                self.state.borrow_mut().manage.set_enabled(true);
                self.print("Raidbars manage mode ON");
                self.print("Shift+Click = Promote to group leader");
                self.print("Alt+Click   = Kick to ungrouped");
                self.print("Ctrl+Click  = Select player then Ctrl+Click destination group");
            }
            Subcommand::Manage(Some(false)) => {
                self.state.borrow_mut().manage.set_enabled(false);
                self.print("Raidbars manage mode OFF");
            }
            Subcommand::Position(position) => {
                if let Some(position) = position {
                    self.settings.left.set(position.left);
                    self.settings.top.set(position.top);
                    self.settings.right.set(position.right);
                    self.settings.bottom.set(position.bottom);
                }
                self.print(format!(
                    "Raidbars position set to ({}, {}, {}, {})",
                    self.settings.left.get(),
                    self.settings.top.get(),
                    self.settings.right.get(),
                    self.settings.bottom.get()
                ));
                if position.is_none() {
                    self.print(usage::POSITION);
                }
            }
            Subcommand::Grid { rows, cols } => {
                let cell = self
                    .ensure_font()
                    .map_or(CellSize::new(0, 0), |metrics| metrics.cell);
                // Loaded only to measure; a disabled overlay keeps no font.
                if !self.settings.enabled.get() {
                    self.clean();
                }
                let anchor = Point::new(self.settings.left.get(), self.settings.top.get());
                let plan = grid_request(rows, cols, anchor, self.render.screen_size(), cell)?;
                self.settings.right.set(plan.right);
                self.settings.bottom.set(plan.bottom);
                self.print(format!(
                    "Setting grid to {} rows by {} cols",
                    plan.rows, plan.cols
                ));
            }
            Subcommand::Groups(switch) => {
                let on = apply_switch(&self.settings.group_sort, switch);
                self.print(format!("Raidbars sort by groups is set to {}", on_off(on)));
            }
            Subcommand::ShowAll(switch) => {
                let on = apply_switch(&self.settings.show_all, switch);
                self.print(format!("Raidbars showall is set to {}", on_off(on)));
            }
            Subcommand::Clickable(flag) => {
                if let Some(flag) = flag {
                    self.settings.clickable.set(flag);
                }
                let on = self.settings.clickable.get();
                self.print(format!("Raidbars clickable is set to {}", on_off(on)));
            }
            Subcommand::Background(alpha) => {
                if let Some(alpha) = alpha {
                    self.settings.background_alpha.set(alpha);
                }
                let alpha = self.settings.background_alpha.get();
                self.print(format!("Raidbars background alpha is set to {alpha}%"));
            }
            Subcommand::Threshold(threshold) => {
                if let Some(threshold) = threshold {
                    self.settings.threshold.set(threshold);
                }
                let threshold = self.settings.threshold.get();
                self.print(format!(
                    "Raidbars filter threshold is set to show values <= to {threshold}%"
                ));
            }
            Subcommand::BarWidth(width) => {
                if let Some(width) = width {
                    self.settings.bar_width.set(width);
                }
                self.print(format!("Bar width set to {}", self.settings.bar_width.get()));
            }
            Subcommand::BarHeight(height) => {
                if let Some(height) = height {
                    self.settings.bar_height.set(height);
                }
                self.print(format!("Bar height set to {}", self.settings.bar_height.get()));
            }
            Subcommand::Font(Some(name)) => {
                self.print(format!("Font filename set to {name}"));
                self.settings.font.set(name);
            }
            Subcommand::Font(None) => {
                self.print(format!("Font filename is {}", self.settings.font.get()));
                let fonts = self.render.available_fonts();
                if !fonts.is_empty() {
                    self.print(format!("Available fonts: {}", fonts.join(", ")));
                }
                self.print(usage::FONT);
            }
            Subcommand::ClassList { kind, list } => {
                if let Some(list) = list {
                    let unknown = command::unknown_classes(&list);
                    if !unknown.is_empty() {
                        self.print(format!("Ignoring unknown classes: {}", unknown.join(" ")));
                    }
                    self.class_setting(kind).set(list);
                }
                self.dump_class_settings();
            }
        }
        Ok(())
    }

    fn class_setting(&self, kind: ClassListKind) -> &Setting<String> {
        match kind {
            ClassListKind::Priority => &self.settings.class_priority,
            ClassListKind::Always => &self.settings.class_always,
            ClassListKind::Never => &self.settings.class_never,
            ClassListKind::Filter => &self.settings.class_filter,
        }
    }

    fn dump_class_settings(&mut self) {
        let priority = self.settings.priority();
        let order: Vec<&str> = priority.iter().map(|category| category.short_name()).collect();
        self.print(format!("RaidBars class priority: {}", order.join(" ")));

        let flags = self.settings.visibility();
        for (kind, set) in [
            (ClassListKind::Always, flags.always),
            (ClassListKind::Never, flags.never),
            (ClassListKind::Filter, flags.filter),
        ] {
            self.print(format!("RaidBars class {}: {}", kind.keyword(), list_text(set)));
        }
    }

    fn report_usage(&mut self, err: &UsageError) {
        debug!(%err, "subcommand rejected");
        match err {
            UsageError::Unknown(_) => {
                for line in usage::ALL {
                    self.status.print(line);
                }
            }
            UsageError::Invalid { .. } | UsageError::Grid(_) => {
                self.print(err.to_string());
                if let Some(usage) = err.usage() {
                    self.print(usage);
                }
            }
        }
    }

    fn print(&mut self, message: impl AsRef<str>) {
        self.status.print(message.as_ref());
    }
}

impl std::fmt::Debug for RaidBars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RaidBars")
            .field("settings", &self.settings)
            .field("snapshot", &state.snapshot)
            .field("manage", &state.manage)
            .field("font_loaded", &state.font.is_some())
            .field("metrics", &state.metrics)
            .field("visible", &state.visible.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn release_on_change<T>(setting: &Setting<T>, releaser: &Releaser) -> Subscription
where
    T: Clone + PartialEq + std::fmt::Debug + 'static,
{
    let releaser = releaser.clone();
    setting.subscribe(move |_| releaser.run())
}

fn apply_switch(setting: &Setting<bool>, switch: Option<command::Switch>) -> bool {
    if let Some(switch) = switch {
        setting.set(switch.apply(setting.get()));
    }
    setting.get()
}

const fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn list_text(set: CategorySet) -> String {
    let names: Vec<&str> = set.iter().map(|category| category.short_name()).collect();
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(" ")
    }
}

fn draw(font: &mut dyn RenderSink, visible: &VisibleList) {
    let cell_height = visible.cell_size().height as f32;
    let label_offset = (cell_height - font.line_spacing() - LABEL_BOTTOM_MARGIN).max(0.0) as i32;
    for (position, cell) in visible.iter_placed() {
        let text_position = Point::new(position.x, position.y + label_offset);
        match cell {
            VisibleCell::Entry(entry) => {
                font.queue_status_bar(&entry.name, position, entry.health_percent, entry.color);
            }
            VisibleCell::Label(slot) => font.queue_text(&slot.label(), text_position, Rgba::LABEL),
            VisibleCell::Empty => font.queue_text(EMPTY_SLOT_TEXT, text_position, Rgba::EMPTY_SLOT),
        }
    }
}
