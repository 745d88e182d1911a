#![no_main]

use libfuzzer_sys::fuzz_target;
use rbar_core::testing::{FakeRenderHost, FakeWorld, RecordingCommands, RecordingStatus};
use rbar_runtime::{OverlayConfig, OverlayHost, RaidBars, command};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let args: Vec<&str> = text.split_whitespace().collect();

    let parsed = command::parse(&args);

    let mut bars = RaidBars::new(
        &OverlayConfig::default(),
        OverlayHost {
            world: Box::new(FakeWorld::new()),
            render: Box::new(FakeRenderHost::new(800, 600)),
            commands: Box::new(RecordingCommands::default()),
            status: Box::new(RecordingStatus::default()),
        },
    );
    let before = bars.export_config();
    bars.command(&args);

    // Rejected input never changes settings.
    if let Err(err) = parsed {
        assert_eq!(bars.export_config(), before, "settings changed by {err:?}");
    }
    // Whatever was applied still validates.
    assert!(bars.export_config().validate().is_empty());
});
