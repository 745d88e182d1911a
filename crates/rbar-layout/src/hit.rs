#![forbid(unsafe_code)]

//! Screen point to visible-list index.
//!
//! [`locate`] is the inverse of [`crate::flow::ColumnFlow::position`]: for
//! the same viewport, cell size and row count, every placed cell's corner
//! maps back to its index. Change both together.

use rbar_core::geometry::{CellSize, Point, Rect};

/// Index of the cell under `point`, or `None` for a miss.
///
/// Misses: left of or above the viewport anchor, a row at or past
/// `rows_per_column`, an index at or past `visible_len`, or a degenerate
/// cell size.
#[must_use]
pub fn locate(
    point: Point,
    viewport: Rect,
    cell: CellSize,
    visible_len: usize,
    rows_per_column: usize,
) -> Option<usize> {
    if !cell.is_valid() || rows_per_column == 0 {
        return None;
    }
    let dx = point.x.checked_sub(viewport.left())?;
    let dy = point.y.checked_sub(viewport.top())?;
    if dx < 0 || dy < 0 {
        return None;
    }

    let row = usize::try_from(dy / cell.height).ok()?;
    if row >= rows_per_column {
        return None;
    }
    let column = usize::try_from(dx / cell.width).ok()?;
    let index = column.checked_mul(rows_per_column)?.checked_add(row)?;
    (index < visible_len).then_some(index)
}
