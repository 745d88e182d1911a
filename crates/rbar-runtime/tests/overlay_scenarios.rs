#![forbid(unsafe_code)]

//! End-to-end overlay behavior against the in-memory host fakes.
//!
//! Run:
//!   cargo test -p rbar-runtime --test overlay_scenarios

use rbar_core::event::{ClickEvent, HostEvent, Modifiers};
use rbar_core::geometry::Point;
use rbar_core::host::Vitals;
use rbar_core::roster::{AffiliationGroup, Category, GroupNumber, GroupSlot, RosterMember};
use rbar_core::testing::{
    FakeRenderHost, FakeWorld, RecordingCommands, RecordingStatus, SentCommand,
};
use rbar_runtime::command::usage;
use rbar_runtime::settings::USE_DEFAULT_FONT;
use rbar_runtime::{OverlayConfig, OverlayHost, RaidBars};

// ============================================================================
// Harness
// ============================================================================

struct Host {
    world: FakeWorld,
    render: FakeRenderHost,
    commands: RecordingCommands,
    status: RecordingStatus,
}

impl Host {
    fn new() -> Self {
        Self {
            world: FakeWorld::new(),
            render: FakeRenderHost::new(800, 600),
            commands: RecordingCommands::default(),
            status: RecordingStatus::default(),
        }
    }

    fn overlay(&self, config: &OverlayConfig) -> RaidBars {
        RaidBars::new(
            config,
            OverlayHost {
                world: Box::new(self.world.clone()),
                render: Box::new(self.render.clone()),
                commands: Box::new(self.commands.clone()),
                status: Box::new(self.status.clone()),
            },
        )
    }
}

fn group(n: u8) -> AffiliationGroup {
    AffiliationGroup::Numbered(GroupNumber::from_display(n).expect("group"))
}

fn member(name: &str, category: Category, group: AffiliationGroup) -> RosterMember {
    RosterMember::new(name, category, group)
}

fn tick(bars: &mut RaidBars, now_ms: u64) {
    bars.handle_event(HostEvent::RenderTick { now_ms });
}

fn enabled() -> OverlayConfig {
    OverlayConfig {
        enabled: true,
        clickable: true,
        show_all: true,
        ..OverlayConfig::default()
    }
}

/// A point inside the cell at `index` of the last render pass.
fn point_of(bars: &RaidBars, index: usize) -> Point {
    let origin = bars.visible().position(index).expect("placed cell");
    Point::new(origin.x + 1, origin.y + 1)
}

fn index_of(bars: &RaidBars, name: &str) -> usize {
    (0..bars.visible().len())
        .find(|&i| bars.visible().entry_at(i).is_some_and(|entry| entry.name == name))
        .expect("entry is visible")
}

fn label_index(bars: &RaidBars, slot: GroupSlot) -> usize {
    bars.visible().labels().position(slot).expect("label is visible")
}

fn ctrl_click(bars: &mut RaidBars, point: Point) -> bool {
    bars.on_click(ClickEvent::left(point.x, point.y).with_modifiers(Modifiers::CTRL))
}

fn manage_on(bars: &mut RaidBars) {
    bars.command(&["manage", "on"]);
}

// ============================================================================
// 1. Select-then-place management
// ============================================================================

#[test]
fn select_then_place_into_group_label() {
    let host = Host::new();
    host.world
        .add_live_member(member("Mona", Category::Cleric, AffiliationGroup::Unaffiliated));
    host.world
        .add_live_member(member("Cleo", Category::Wizard, group(3)));
    let mut bars = host.overlay(&OverlayConfig::default());

    manage_on(&mut bars);
    assert!(host.status.contains("Raidbars manage mode ON"));
    assert!(host.status.contains("Ctrl+Click  = Select player then Ctrl+Click destination group"));
    tick(&mut bars, 0);

    let mona = point_of(&bars, index_of(&bars, "Mona"));
    assert!(ctrl_click(&mut bars, mona));
    assert_eq!(bars.management().pending(), Some("Mona"));
    assert!(host.commands.sent().is_empty());

    let third = GroupSlot::new(2).expect("slot");
    let label = point_of(&bars, label_index(&bars, third));
    assert!(ctrl_click(&mut bars, label));

    assert_eq!(
        host.commands.sent(),
        [SentCommand::Move {
            name: "Mona".to_owned(),
            group_or_zero: 3
        }]
    );
    assert_eq!(bars.management().pending(), None);
    assert_eq!(host.status.last().as_deref(), Some("Moving Mona to group 3."));
}

#[test]
fn full_group_rejects_placement() {
    let host = Host::new();
    for i in 0..6 {
        host.world
            .add_live_member(member(&format!("Tank{i}"), Category::Warrior, group(1)));
    }
    host.world
        .add_live_member(member("Foo", Category::Rogue, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&OverlayConfig::default());
    manage_on(&mut bars);
    tick(&mut bars, 0);

    let foo = point_of(&bars, index_of(&bars, "Foo"));
    assert!(ctrl_click(&mut bars, foo));
    assert_eq!(bars.management().pending(), Some("Foo"));

    let first = GroupSlot::new(0).expect("slot");
    let label = point_of(&bars, label_index(&bars, first));
    assert!(ctrl_click(&mut bars, label));

    assert!(host.commands.sent().is_empty());
    assert!(host.status.contains("Group 1 is full. Cannot move Foo."));
    assert_eq!(bars.management().pending(), None);
}

#[test]
fn other_gestures_cancel_a_pending_selection() {
    let host = Host::new();
    host.world
        .add_live_member(member("Mona", Category::Cleric, group(2)));
    let mut bars = host.overlay(&OverlayConfig::default());
    manage_on(&mut bars);
    tick(&mut bars, 0);

    let mona = point_of(&bars, index_of(&bars, "Mona"));
    assert!(ctrl_click(&mut bars, mona));
    assert!(bars.management().is_selecting());

    assert!(bars.on_click(ClickEvent::left(mona.x, mona.y).with_modifiers(Modifiers::ALT)));
    assert!(!bars.management().is_selecting());
    assert_eq!(
        host.commands.sent(),
        [SentCommand::Move {
            name: "Mona".to_owned(),
            group_or_zero: 0
        }]
    );
}

#[test]
fn promote_ungrouped_member_into_first_empty_group() {
    let host = Host::new();
    host.world
        .add_live_member(member("Lead", Category::Paladin, group(1)));
    host.world
        .add_live_member(member("Solo", Category::Bard, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&OverlayConfig::default());
    manage_on(&mut bars);
    tick(&mut bars, 0);

    let solo = point_of(&bars, index_of(&bars, "Solo"));
    assert!(bars.on_click(ClickEvent::left(solo.x, solo.y).with_modifiers(Modifiers::SHIFT)));
    let lead = point_of(&bars, index_of(&bars, "Lead"));
    assert!(bars.on_click(ClickEvent::left(lead.x, lead.y).with_modifiers(Modifiers::SHIFT)));

    assert_eq!(
        host.commands.sent(),
        [
            SentCommand::Move {
                name: "Solo".to_owned(),
                group_or_zero: 2
            },
            SentCommand::Promote {
                name: "Lead".to_owned()
            },
        ]
    );
}

#[test]
fn manage_off_returns_gestures_to_targeting() {
    let host = Host::new();
    let mona = host
        .world
        .add_live_member(member("Mona", Category::Cleric, group(2)));
    let mut bars = host.overlay(&OverlayConfig::default());
    manage_on(&mut bars);
    bars.command(&["manage", "off"]);
    assert_eq!(host.status.last().as_deref(), Some("Raidbars manage mode OFF"));
    tick(&mut bars, 0);

    let point = point_of(&bars, index_of(&bars, "Mona"));
    assert!(ctrl_click(&mut bars, point));
    assert_eq!(host.commands.sent(), [SentCommand::Target(mona)]);
}

// ============================================================================
// 2. Resource lifecycle
// ============================================================================

#[test]
fn custom_font_failure_falls_back_to_default() {
    let host = Host::new();
    host.world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&OverlayConfig {
        font: "tahoma_10".to_owned(),
        ..enabled()
    });

    tick(&mut bars, 0);
    assert!(host.status.contains("Failed to load font: tahoma_10"));
    assert_eq!(bars.settings().font.get(), USE_DEFAULT_FONT);
    assert!(host.render.frames().is_empty());

    tick(&mut bars, 16);
    assert!(bars.is_font_loaded());
    assert_eq!(host.render.load_attempts(), ["tahoma_10", "arial_08"]);
    assert_eq!(host.render.last_frame_names(), ["Anna"]);
}

#[test]
fn default_font_failure_disables_overlay() {
    let host = Host::new();
    host.render.remove_font("arial_08");
    let mut bars = host.overlay(&enabled());

    tick(&mut bars, 0);
    assert!(host.status.contains("Failed to load font: arial_08"));
    assert!(host.status.contains("Disabling raidbars due to font issue"));
    assert!(!bars.settings().enabled.get());

    tick(&mut bars, 16);
    assert_eq!(host.render.load_attempts().len(), 1);
}

#[test]
fn clean_releases_font_on_lifecycle_events() {
    let host = Host::new();
    host.world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&enabled());

    for (n, event) in [
        HostEvent::ZoneTransition,
        HostEvent::UiCleanup,
        HostEvent::DeviceReset,
    ]
    .into_iter()
    .enumerate()
    {
        tick(&mut bars, n as u64 * 16);
        assert!(bars.is_font_loaded());
        bars.handle_event(event);
        assert!(!bars.is_font_loaded());
        assert!(bars.visible().is_empty());
        assert!(bars.snapshot().is_empty());
        assert_eq!(host.render.released(), n + 1);
    }
    assert_eq!(host.render.live_fonts(), 0);
}

#[test]
fn bar_size_and_font_changes_reload_the_font() {
    let host = Host::new();
    host.render.add_font("tahoma_10");
    host.world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&enabled());
    tick(&mut bars, 0);

    bars.command(&["barwidth", "120"]);
    assert_eq!(host.status.last().as_deref(), Some("Bar width set to 120"));
    assert!(!bars.is_font_loaded());
    tick(&mut bars, 16);
    assert_eq!(bars.metrics().map(|m| m.bar_width), Some(120.0));

    bars.command(&["font", "tahoma_10"]);
    assert!(!bars.is_font_loaded());
    tick(&mut bars, 32);
    assert_eq!(host.render.load_attempts(), ["arial_08", "arial_08", "tahoma_10"]);
    assert_eq!(host.render.live_fonts(), 1);
}

#[test]
fn despawn_sweeps_the_visible_list() {
    let host = Host::new();
    let anna = host
        .world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    host.world.set_vitals("Anna", Vitals::new(40, 100));
    let mut bars = host.overlay(&enabled());
    tick(&mut bars, 0);
    assert!(bars.visible().references(anna));

    host.world.despawn("Anna");
    bars.handle_event(HostEvent::Despawn(anna));
    assert!(!bars.visible().references(anna));
    assert!(!bars.snapshot().references(anna));

    // The entry stays visible but can no longer be targeted.
    let point = point_of(&bars, index_of(&bars, "Anna"));
    assert!(!bars.on_click(ClickEvent::left(point.x, point.y)));
    assert!(host.commands.sent().is_empty());
}

#[test]
fn despawn_sweeps_while_the_entity_is_still_known() {
    let host = Host::new();
    let anna = host
        .world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&enabled());
    tick(&mut bars, 0);

    bars.handle_event(HostEvent::Despawn(anna));
    assert!(!bars.visible().references(anna));
    assert!(!bars.snapshot().references(anna));
}

#[test]
fn roster_change_forces_rebuild_before_timer() {
    let host = Host::new();
    host.world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&enabled());
    tick(&mut bars, 0);

    host.world
        .add_live_member(member("Bree", Category::Warrior, AffiliationGroup::Unaffiliated));
    tick(&mut bars, 100);
    assert_eq!(host.render.last_frame_names(), ["Anna"]);

    bars.handle_event(HostEvent::RosterChanged);
    tick(&mut bars, 200);
    assert_eq!(host.render.last_frame_names(), ["Anna", "Bree"]);
}

// ============================================================================
// 3. Subcommands
// ============================================================================

#[test]
fn malformed_commands_leave_settings_untouched() {
    let host = Host::new();
    let mut bars = host.overlay(&enabled());
    let before = bars.export_config();

    for args in [
        &["position", "10"][..],
        &["position", "a", "b"],
        &["position", "50", "5", "10", "100"],
        &["background", "250"],
        &["threshold", "-1"],
        &["barwidth", "999"],
        &["barheight", "x"],
        &["groups", "sideways"],
        &["manage", "maybe"],
        &["grid", "4"],
        &["grid", "0", "3"],
        &["sparkle"],
    ] {
        bars.command(args);
    }

    assert_eq!(bars.export_config(), before);
    assert!(host.status.contains(usage::POSITION));
    assert!(host.status.contains(usage::BACKGROUND));
    assert!(host.status.contains(usage::GRID));
    assert!(host.status.contains(usage::THRESHOLD));
}

#[test]
fn unknown_subcommand_prints_usage_block() {
    let host = Host::new();
    let mut bars = host.overlay(&OverlayConfig::default());
    bars.command(&["sparkle"]);
    assert_eq!(host.status.lines(), usage::ALL);
}

#[test]
fn toggles_and_queries() {
    let host = Host::new();
    let mut bars = host.overlay(&OverlayConfig::default());

    bars.command(&["toggle"]);
    assert_eq!(host.status.last().as_deref(), Some("Raidbars are on"));
    bars.command(&["groups", "toggle"]);
    assert_eq!(host.status.last().as_deref(), Some("Raidbars sort by groups is set to on"));
    bars.command(&["groups"]);
    assert_eq!(host.status.last().as_deref(), Some("Raidbars sort by groups is set to on"));
    bars.command(&["threshold", "80"]);
    assert_eq!(
        host.status.last().as_deref(),
        Some("Raidbars filter threshold is set to show values <= to 80%")
    );
    bars.command(&["background", "40"]);
    assert_eq!(
        host.status.last().as_deref(),
        Some("Raidbars background alpha is set to 40%")
    );
    bars.command(&["position", "10", "20", "300", "400"]);
    assert_eq!(
        host.status.last().as_deref(),
        Some("Raidbars position set to (10, 20, 300, 400)")
    );

    let config = bars.export_config();
    assert!(config.enabled && config.group_sort);
    assert_eq!((config.threshold, config.background_alpha), (80, 40));
    assert_eq!(config.position.right, 300);
}

#[test]
fn class_lists_are_stored_uppercased_and_dumped() {
    let host = Host::new();
    let mut bars = host.overlay(&OverlayConfig::default());

    bars.command(&["never", "war", "xyz"]);
    assert_eq!(bars.settings().class_never.get(), "WAR XYZ");
    assert!(host.status.contains("Ignoring unknown classes: XYZ"));
    assert!(host.status.contains("RaidBars class never: WAR"));
    assert!(host.status.contains("RaidBars class always: (none)"));

    host.status.clear();
    bars.command(&["priority", "clr", "war"]);
    let first = host.status.lines().into_iter().next().expect("priority line");
    assert!(first.starts_with("RaidBars class priority: CLR WAR "));
}

#[test]
fn grid_loads_the_font_on_demand() {
    let host = Host::new();
    let mut bars = host.overlay(&OverlayConfig::default());

    bars.command(&["grid", "4", "3"]);
    assert_eq!(host.status.last().as_deref(), Some("Setting grid to 4 rows by 3 cols"));
    // Anchor (5, 5), cell 85x18.
    assert_eq!(bars.settings().right.get(), 5 + 3 * 85);
    assert_eq!(bars.settings().bottom.get(), 5 + 4 * 18);
    // Measured, then released again since the overlay is off.
    assert_eq!(host.render.load_attempts(), ["arial_08"]);
    assert_eq!(host.render.live_fonts(), 0);
}

#[test]
fn grid_after_clean_sets_edges_and_shapes_the_flow() {
    let host = Host::new();
    host.world
        .add_live_member(member("Anna", Category::Warrior, AffiliationGroup::Unaffiliated));
    let mut bars = host.overlay(&enabled());
    tick(&mut bars, 0);
    bars.handle_event(HostEvent::ZoneTransition);
    assert!(!bars.is_font_loaded());

    bars.command(&["grid", "4", "3"]);
    assert_eq!(host.status.last().as_deref(), Some("Setting grid to 4 rows by 3 cols"));
    assert_eq!(bars.settings().right.get(), 5 + 3 * 85);
    assert!(bars.is_font_loaded());

    tick(&mut bars, 16);
    let flow = *bars.visible().flow();
    assert_eq!((flow.rows_per_column(), flow.columns()), (4, 3));
}
