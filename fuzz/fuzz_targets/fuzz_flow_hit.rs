#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rbar_core::geometry::{CellSize, Point, Rect};
use rbar_core::roster::GroupSlot;
use rbar_layout::{VisibleCell, flow, locate};

#[derive(Debug, Arbitrary)]
struct Input {
    x: i16,
    y: i16,
    width: u16,
    height: u16,
    cell_width: i8,
    cell_height: i8,
    /// Label slot per cell; values past the last slot become empty cells.
    cells: Vec<u8>,
    probes: Vec<(i16, i16)>,
}

fuzz_target!(|input: Input| {
    let viewport = Rect::new(
        i32::from(input.x),
        i32::from(input.y),
        i32::from(input.width % 4096),
        i32::from(input.height % 4096),
    );
    let cell = CellSize::new(i32::from(input.cell_width), i32::from(input.cell_height));
    let cells: Vec<VisibleCell> = input
        .cells
        .iter()
        .take(512)
        .map(|&b| match GroupSlot::new(usize::from(b)) {
            Some(slot) => VisibleCell::Label(slot),
            None => VisibleCell::Empty,
        })
        .collect();

    let list = flow(cells, viewport, cell);
    assert!(list.len() <= list.flow().capacity());

    let rows = list.flow().rows_per_column();
    for (index, (corner, _)) in list.iter_placed().enumerate() {
        assert_eq!(locate(corner, viewport, cell, list.len(), rows), Some(index));
    }
    for (slot, position) in list.labels().iter() {
        assert_eq!(list.get(position).and_then(VisibleCell::label_slot), Some(slot));
    }
    for &(px, py) in input.probes.iter().take(64) {
        let point = Point::new(i32::from(px), i32::from(py));
        if let Some(index) = list.locate(point) {
            assert!(index < list.len());
        }
    }
});
