#![forbid(unsafe_code)]

//! In-memory fakes for the host collaborator traits.
//!
//! Every fake is a cheap handle around shared `Rc<RefCell<..>>` state, so a
//! test can hand one clone to the overlay and keep another to script the
//! world and inspect what the overlay did.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::color::Rgba;
use crate::geometry::{Point, Rect, Size};
use crate::host::{
    CommandChannel, FontError, LiveEntityResolver, RenderHost, RenderSink, RosterSource,
    StatusSink, TextSize, Vitals,
};
use crate::roster::{AffiliationGroup, EntityHandle, GroupNumber, RosterMember};

// ---------------------------------------------------------------------------
// World: roster + live entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct LiveObject {
    handle: EntityHandle,
    vitals: Vitals,
    participant: bool,
}

#[derive(Debug, Default)]
struct WorldState {
    active: bool,
    members: Vec<RosterMember>,
    live: BTreeMap<String, LiveObject>,
    self_name: Option<String>,
    next_handle: u64,
}

/// Scriptable roster and entity world.
#[derive(Debug, Clone, Default)]
pub struct FakeWorld {
    state: Rc<RefCell<WorldState>>,
}

impl FakeWorld {
    /// An active roster with no members.
    #[must_use]
    pub fn new() -> Self {
        let world = Self::default();
        world.state.borrow_mut().active = true;
        world
    }

    pub fn set_active(&self, active: bool) {
        self.state.borrow_mut().active = active;
    }

    /// Add a roster member without a live object.
    pub fn add_member(&self, member: RosterMember) {
        self.state.borrow_mut().members.push(member);
    }

    /// Add a roster member and spawn a full-health live object for it.
    pub fn add_live_member(&self, member: RosterMember) -> EntityHandle {
        let name = member.name.clone();
        self.add_member(member);
        self.spawn(&name, Vitals::new(100, 100))
    }

    /// Spawn (or respawn) a participant object for `name`.
    pub fn spawn(&self, name: &str, vitals: Vitals) -> EntityHandle {
        self.spawn_object(name, vitals, true)
    }

    /// Spawn a non-participant object (a corpse) under `name`.
    pub fn spawn_corpse(&self, name: &str) -> EntityHandle {
        self.spawn_object(name, Vitals::default(), false)
    }

    fn spawn_object(&self, name: &str, vitals: Vitals, participant: bool) -> EntityHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = EntityHandle(state.next_handle);
        state.live.insert(
            name.to_owned(),
            LiveObject {
                handle,
                vitals,
                participant,
            },
        );
        handle
    }

    /// Remove the live object for `name`, returning its handle.
    pub fn despawn(&self, name: &str) -> Option<EntityHandle> {
        self.state
            .borrow_mut()
            .live
            .remove(name)
            .map(|object| object.handle)
    }

    pub fn set_vitals(&self, name: &str, vitals: Vitals) {
        if let Some(object) = self.state.borrow_mut().live.get_mut(name) {
            object.vitals = vitals;
        }
    }

    pub fn set_group(&self, name: &str, group: AffiliationGroup) {
        if let Some(member) = self
            .state
            .borrow_mut()
            .members
            .iter_mut()
            .find(|member| member.name == name)
        {
            member.group = group;
        }
    }

    /// Mark `name` as the operator's own character.
    pub fn set_self(&self, name: &str) {
        self.state.borrow_mut().self_name = Some(name.to_owned());
    }

    #[must_use]
    pub fn handle_of(&self, name: &str) -> Option<EntityHandle> {
        self.state.borrow().live.get(name).map(|object| object.handle)
    }
}

impl RosterSource for FakeWorld {
    fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    fn members(&self) -> Vec<RosterMember> {
        self.state.borrow().members.clone()
    }
}

impl LiveEntityResolver for FakeWorld {
    fn resolve(&self, name: &str) -> Option<EntityHandle> {
        self.handle_of(name)
    }

    fn is_participant(&self, handle: EntityHandle) -> bool {
        self.state
            .borrow()
            .live
            .values()
            .any(|object| object.handle == handle && object.participant)
    }

    fn vitals(&self, handle: EntityHandle) -> Option<Vitals> {
        self.state
            .borrow()
            .live
            .values()
            .find(|object| object.handle == handle)
            .map(|object| object.vitals)
    }

    fn self_handle(&self) -> Option<EntityHandle> {
        let state = self.state.borrow();
        let name = state.self_name.as_ref()?;
        state.live.get(name).map(|object| object.handle)
    }

    fn group_of(&self, name: &str) -> Option<AffiliationGroup> {
        self.state
            .borrow()
            .members
            .iter()
            .find(|member| member.name == name)
            .map(|member| member.group)
    }

    fn member_count_of(&self, group: GroupNumber) -> usize {
        self.state
            .borrow()
            .members
            .iter()
            .filter(|member| member.group == AffiliationGroup::Numbered(group))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// One queued draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Text {
        text: String,
        position: Point,
        color: Rgba,
    },
    StatusBar {
        name: String,
        position: Point,
        health_percent: u8,
        color: Rgba,
    },
    Background {
        rect: Rect,
        color: Rgba,
    },
}

#[derive(Debug, Default)]
struct RenderState {
    screen: Size,
    ui_visible: bool,
    fonts: BTreeSet<String>,
    loads: Vec<String>,
    released: usize,
    queued: Vec<DrawOp>,
    frames: Vec<Vec<DrawOp>>,
}

/// Render host whose fonts measure every glyph as 6×10 pixels.
#[derive(Debug, Clone)]
pub struct FakeRenderHost {
    state: Rc<RefCell<RenderState>>,
}

impl FakeRenderHost {
    pub const GLYPH_WIDTH: f32 = 6.0;
    pub const GLYPH_HEIGHT: f32 = 10.0;

    /// A visible UI of the given size that can load `arial_08`.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let state = RenderState {
            screen: Size::new(width, height),
            ui_visible: true,
            fonts: BTreeSet::from(["arial_08".to_owned()]),
            ..RenderState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn add_font(&self, name: &str) {
        self.state.borrow_mut().fonts.insert(name.to_owned());
    }

    pub fn remove_font(&self, name: &str) {
        self.state.borrow_mut().fonts.remove(name);
    }

    pub fn set_ui_visible(&self, visible: bool) {
        self.state.borrow_mut().ui_visible = visible;
    }

    /// Names passed to `load_font`, including failed attempts.
    #[must_use]
    pub fn load_attempts(&self) -> Vec<String> {
        self.state.borrow().loads.clone()
    }

    /// Number of fonts dropped so far.
    #[must_use]
    pub fn released(&self) -> usize {
        self.state.borrow().released
    }

    /// Fonts loaded and not yet dropped.
    #[must_use]
    pub fn live_fonts(&self) -> usize {
        let state = self.state.borrow();
        let successful = state
            .loads
            .iter()
            .filter(|name| state.fonts.contains(*name))
            .count();
        successful.saturating_sub(state.released)
    }

    /// Draw calls of every flushed frame.
    #[must_use]
    pub fn frames(&self) -> Vec<Vec<DrawOp>> {
        self.state.borrow().frames.clone()
    }

    /// Draw calls of the most recent flushed frame.
    #[must_use]
    pub fn last_frame(&self) -> Vec<DrawOp> {
        self.state.borrow().frames.last().cloned().unwrap_or_default()
    }

    /// Names drawn as status bars in the most recent frame, in draw order.
    #[must_use]
    pub fn last_frame_names(&self) -> Vec<String> {
        self.last_frame()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::StatusBar { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }
}

impl RenderHost for FakeRenderHost {
    fn screen_size(&self) -> Size {
        self.state.borrow().screen
    }

    fn is_ui_visible(&self) -> bool {
        self.state.borrow().ui_visible
    }

    fn load_font(&mut self, name: &str) -> Result<Box<dyn RenderSink>, FontError> {
        let mut state = self.state.borrow_mut();
        state.loads.push(name.to_owned());
        if !state.fonts.contains(name) {
            return Err(FontError::NotFound {
                name: name.to_owned(),
            });
        }
        Ok(Box::new(FakeFont {
            state: Rc::clone(&self.state),
        }))
    }

    fn available_fonts(&self) -> Vec<String> {
        self.state.borrow().fonts.iter().cloned().collect()
    }
}

struct FakeFont {
    state: Rc<RefCell<RenderState>>,
}

impl RenderSink for FakeFont {
    fn measure(&self, text: &str) -> TextSize {
        TextSize::new(
            text.chars().count() as f32 * FakeRenderHost::GLYPH_WIDTH,
            FakeRenderHost::GLYPH_HEIGHT,
        )
    }

    fn line_spacing(&self) -> f32 {
        FakeRenderHost::GLYPH_HEIGHT
    }

    fn set_bar_size(&mut self, _width: f32, _height: f32) {}

    fn queue_text(&mut self, text: &str, position: Point, color: Rgba) {
        self.state.borrow_mut().queued.push(DrawOp::Text {
            text: text.to_owned(),
            position,
            color,
        });
    }

    fn queue_status_bar(&mut self, name: &str, position: Point, health_percent: u8, color: Rgba) {
        self.state.borrow_mut().queued.push(DrawOp::StatusBar {
            name: name.to_owned(),
            position,
            health_percent,
            color,
        });
    }

    fn queue_background_rect(&mut self, rect: Rect, color: Rgba) {
        self.state
            .borrow_mut()
            .queued
            .push(DrawOp::Background { rect, color });
    }

    fn flush(&mut self) {
        let mut state = self.state.borrow_mut();
        let frame = std::mem::take(&mut state.queued);
        state.frames.push(frame);
    }
}

impl Drop for FakeFont {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.released += 1;
        state.queued.clear();
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A command observed on the [`CommandChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentCommand {
    Move { name: String, group_or_zero: u8 },
    Promote { name: String },
    Target(EntityHandle),
}

/// Records every outgoing command.
#[derive(Debug, Clone, Default)]
pub struct RecordingCommands {
    sent: Rc<RefCell<Vec<SentCommand>>>,
}

impl RecordingCommands {
    #[must_use]
    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.borrow().clone()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl CommandChannel for RecordingCommands {
    fn send_move(&mut self, name: &str, group_or_zero: u8) {
        self.sent.borrow_mut().push(SentCommand::Move {
            name: name.to_owned(),
            group_or_zero,
        });
    }

    fn send_promote(&mut self, name: &str) {
        self.sent.borrow_mut().push(SentCommand::Promote {
            name: name.to_owned(),
        });
    }

    fn set_target(&mut self, handle: EntityHandle) {
        self.sent.borrow_mut().push(SentCommand::Target(handle));
    }
}

/// Records every status line.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatus {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingStatus {
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl StatusSink for RecordingStatus {
    fn print(&mut self, message: &str) {
        self.lines.borrow_mut().push(message.to_owned());
    }
}
