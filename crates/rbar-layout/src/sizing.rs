#![forbid(unsafe_code)]

//! Cell-size derivation and the manual grid helper.
//!
//! Metrics are derived once per font load from a fixed sample name. Cell
//! sizes are rounded up to whole pixels so flow and hit testing agree
//! exactly.

use rbar_core::geometry::{CellSize, Point, Size};
use rbar_core::host::TextSize;

/// Sample measured to size bars: a long name made of average-width glyphs.
pub const SAMPLE_NAME: &str = "Fakenametotest";

pub const BAR_WIDTH_MIN: f32 = 10.0;
pub const BAR_WIDTH_MAX: f32 = 150.0;
pub const BAR_HEIGHT_MIN: f32 = 4.0;
pub const BAR_HEIGHT_MAX: f32 = 50.0;

/// Largest row or column count the grid helper accepts.
pub const GRID_MAX: i32 = 100;

/// Bar and cell dimensions for the loaded font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarMetrics {
    pub bar_width: f32,
    pub bar_height: f32,
    pub cell: CellSize,
}

impl BarMetrics {
    /// Derive metrics from the measured sample. A zero setting means
    /// automatic sizing from the sample.
    #[must_use]
    pub fn derive(sample: TextSize, bar_width_setting: i32, bar_height_setting: i32) -> Self {
        let bar_width = pick(bar_width_setting, sample.width * 0.9).clamp(BAR_WIDTH_MIN, BAR_WIDTH_MAX);
        let bar_height =
            pick(bar_height_setting, sample.height * 0.7).clamp(BAR_HEIGHT_MIN, BAR_HEIGHT_MAX);

        let width = (sample.width + 0.25).max(bar_width + 5.0);
        let height = (sample.height + bar_height + 0.25).max(bar_height + 2.0);
        Self {
            bar_width,
            bar_height,
            cell: CellSize::new(width.ceil() as i32, height.ceil() as i32),
        }
    }
}

fn pick(setting: i32, automatic: f32) -> f32 {
    if setting == 0 {
        automatic.round()
    } else {
        setting as f32
    }
}

// ---------------------------------------------------------------------------
// Grid helper
// ---------------------------------------------------------------------------

/// Why a grid request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("rows and columns must be between 1 and {GRID_MAX} (got {rows} x {cols})")]
    OutOfRange { rows: i32, cols: i32 },
    #[error("cell size is not known yet; load a font first")]
    NoCellSize,
    #[error("cannot fit any bars on screen; reduce position left or top")]
    NoFit,
}

/// Result of a grid request: the clamped grid and the edges to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlan {
    pub rows: i32,
    pub cols: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Size the viewport for `rows` x `cols` cells anchored at `anchor`,
/// clamped to what fits before the screen edge.
///
/// # Errors
///
/// [`GridError::OutOfRange`] for counts outside `1..=100`,
/// [`GridError::NoCellSize`] for a degenerate cell, and
/// [`GridError::NoFit`] when not even one cell fits.
pub fn grid_request(
    rows: i32,
    cols: i32,
    anchor: Point,
    screen: Size,
    cell: CellSize,
) -> Result<GridPlan, GridError> {
    if !(1..=GRID_MAX).contains(&rows) || !(1..=GRID_MAX).contains(&cols) {
        return Err(GridError::OutOfRange { rows, cols });
    }
    if !cell.is_valid() {
        return Err(GridError::NoCellSize);
    }

    let max_rows = (screen.height - anchor.y) / cell.height;
    let max_cols = (screen.width - anchor.x) / cell.width;
    if max_rows <= 0 || max_cols <= 0 {
        return Err(GridError::NoFit);
    }

    let rows = rows.min(max_rows);
    let cols = cols.min(max_cols);
    Ok(GridPlan {
        rows,
        cols,
        right: anchor.x + cols * cell.width,
        bottom: anchor.y + rows * cell.height,
    })
}
