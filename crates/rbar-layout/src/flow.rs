#![forbid(unsafe_code)]

//! Column-major flow of cells into a viewport.
//!
//! Cells fill the first column top to bottom, then wrap to the next column
//! one cell width to the right. Cells past the last whole column are
//! dropped: overflow is a display policy, not an error.
//!
//! # Invariants
//!
//! 1. `rows_per_column = floor(viewport.height / cell.height)` and
//!    `columns = floor(viewport.width / cell.width)`.
//! 2. Cell `i` sits at column `i / rows`, row `i % rows`.
//! 3. Every placed cell lies entirely inside the viewport.
//! 4. [`crate::hit::locate`] maps each placed cell's top-left corner back
//!    to its index.
//!
//! # Failure Modes
//!
//! A viewport that cannot fit one cell, or a non-positive cell size, has
//! zero capacity and yields an empty list.

use rbar_core::geometry::{CellSize, Point, Rect};

use crate::cell::{VisibleCell, VisibleList};

/// Grid geometry for one viewport and cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnFlow {
    viewport: Rect,
    cell: CellSize,
    rows_per_column: usize,
    columns: usize,
}

impl ColumnFlow {
    #[must_use]
    pub fn new(viewport: Rect, cell: CellSize) -> Self {
        let (rows_per_column, columns) = if cell.is_valid() && !viewport.is_empty() {
            (
                fit_count(viewport.height, cell.height),
                fit_count(viewport.width, cell.width),
            )
        } else {
            (0, 0)
        };
        Self {
            viewport,
            cell,
            rows_per_column,
            columns,
        }
    }

    #[inline]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    #[inline]
    pub const fn cell(&self) -> CellSize {
        self.cell
    }

    #[inline]
    pub const fn rows_per_column(&self) -> usize {
        self.rows_per_column
    }

    #[inline]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// How many cells fit.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.rows_per_column * self.columns
    }

    /// Top-left corner of cell `index`. Only meaningful below
    /// [`capacity`](Self::capacity).
    #[must_use]
    pub fn position(&self, index: usize) -> Point {
        if self.rows_per_column == 0 {
            return self.viewport.anchor();
        }
        let column = index / self.rows_per_column;
        let row = index % self.rows_per_column;
        Point::new(
            self.viewport.left() + column as i32 * self.cell.width,
            self.viewport.top() + row as i32 * self.cell.height,
        )
    }

    /// Screen rectangle of cell `index`.
    #[must_use]
    pub fn cell_rect(&self, index: usize) -> Rect {
        let origin = self.position(index);
        Rect::new(origin.x, origin.y, self.cell.width, self.cell.height)
    }
}

fn fit_count(extent: i32, step: i32) -> usize {
    usize::try_from(extent / step).unwrap_or(0)
}

/// Place `cells` column-major into `viewport`, dropping whatever does not
/// fit.
#[must_use]
pub fn flow(mut cells: Vec<VisibleCell>, viewport: Rect, cell: CellSize) -> VisibleList {
    let grid = ColumnFlow::new(viewport, cell);
    #[cfg(feature = "tracing")]
    let produced = cells.len();
    cells.truncate(grid.capacity());

    #[cfg(feature = "tracing")]
    {
        if produced > cells.len() {
            tracing::debug!(
                produced,
                placed = cells.len(),
                capacity = grid.capacity(),
                "flow dropped overflow cells"
            );
        }
    }

    let positions = (0..cells.len()).map(|i| grid.position(i)).collect();
    VisibleList::from_parts(grid, cells, positions)
}
