#![forbid(unsafe_code)]

//! Structured logging emitted by the overlay.
//!
//! Run:
//!   cargo test -p rbar-runtime --test tracing_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

use rbar_core::event::HostEvent;
use rbar_core::roster::{AffiliationGroup, Category, RosterMember};
use rbar_core::testing::{FakeRenderHost, FakeWorld, RecordingCommands, RecordingStatus};
use rbar_runtime::{OverlayConfig, OverlayHost, RaidBars};

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

#[derive(Default, Clone)]
struct Captured {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    ids: Arc<Mutex<HashMap<u64, usize>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Captured {
    fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .filter(|span| span.name == name)
            .cloned()
            .collect()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Captured
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let mut spans = self.spans.lock().unwrap();
        self.ids.lock().unwrap().insert(id.into_u64(), spans.len());
        spans.push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        values.record(&mut visitor);
        let Some(&index) = self.ids.lock().unwrap().get(&id.into_u64()) else {
            return;
        };
        if let Some(span) = self.spans.lock().unwrap().get_mut(index) {
            span.fields.extend(visitor.0);
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .into_iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value)
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
        });
    }
}

fn with_capture(f: impl FnOnce()) -> Captured {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());
    tracing::subscriber::with_default(subscriber, f);
    captured
}

fn overlay(world: &FakeWorld, render: &FakeRenderHost, config: &OverlayConfig) -> RaidBars {
    RaidBars::new(
        config,
        OverlayHost {
            world: Box::new(world.clone()),
            render: Box::new(render.clone()),
            commands: Box::new(RecordingCommands::default()),
            status: Box::new(RecordingStatus::default()),
        },
    )
}

fn enabled() -> OverlayConfig {
    OverlayConfig {
        enabled: true,
        show_all: true,
        ..OverlayConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn render_pass_span_records_placed_cells() {
    let world = FakeWorld::new();
    for name in ["Anna", "Bree", "Cara"] {
        world.add_live_member(RosterMember::new(
            name,
            Category::Druid,
            AffiliationGroup::Unaffiliated,
        ));
    }
    let render = FakeRenderHost::new(800, 600);
    let mut bars = overlay(&world, &render, &enabled());

    let captured = with_capture(|| {
        bars.handle_event(HostEvent::RenderTick { now_ms: 0 });
    });

    let spans = captured.spans_named("raidbars.render");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields.get("placed").map(String::as_str), Some("3"));
    assert_eq!(spans[0].fields.get("now_ms").map(String::as_str), Some("0"));
    assert!(
        captured
            .events()
            .iter()
            .any(|event| event.message == "snapshot rebuilt")
    );
}

#[test]
fn font_failure_is_a_warning() {
    let world = FakeWorld::new();
    let render = FakeRenderHost::new(800, 600);
    let mut bars = overlay(
        &world,
        &render,
        &OverlayConfig {
            font: "missing_12".to_owned(),
            ..enabled()
        },
    );

    let captured = with_capture(|| {
        bars.handle_event(HostEvent::RenderTick { now_ms: 0 });
    });

    let warnings: Vec<_> = captured
        .events()
        .into_iter()
        .filter(|event| event.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "font load failed");
}

#[test]
fn management_commands_are_logged_at_info() {
    let world = FakeWorld::new();
    world.add_live_member(RosterMember::new(
        "Mona",
        Category::Cleric,
        AffiliationGroup::Unaffiliated,
    ));
    let render = FakeRenderHost::new(800, 600);
    let mut bars = overlay(&world, &render, &OverlayConfig::default());

    let captured = with_capture(|| {
        bars.command(&["manage", "on"]);
    });
    assert!(
        captured
            .events()
            .iter()
            .any(|event| event.level == tracing::Level::INFO)
    );
}
