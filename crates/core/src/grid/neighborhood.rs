//! Neighborhood helpers shared by the grid algorithms

use std::ops::Range;

/// The 8 immediate neighbors as (row_offset, col_offset), in raster order.
pub const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Planar distance to a neighbor in cells: 1 for cardinal, sqrt(2) for diagonal
#[inline]
pub fn neighbor_distance(dr: isize, dc: isize) -> f64 {
    if dr != 0 && dc != 0 {
        std::f64::consts::SQRT_2
    } else {
        1.0
    }
}

/// Offset (row, col) by (dr, dc), returning `None` when the result leaves a
/// grid of the given shape.
#[inline]
pub fn offset_cell(
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    shape: (usize, usize),
) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    (r < shape.0 && c < shape.1).then_some((r, c))
}

/// A square window of a given radius centered on a cell, clamped to the grid.
///
/// Cells near the border get a smaller effective window; nothing is wrapped
/// and no sentinel padding is introduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Window {
    pub fn clamped(row: usize, col: usize, radius: usize, shape: (usize, usize)) -> Self {
        Self {
            rows: clamped_span(row, radius, shape.0),
            cols: clamped_span(col, radius, shape.1),
        }
    }

    /// Number of cells covered
    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate (row, col) in raster order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .clone()
            .flat_map(move |r| self.cols.clone().map(move |c| (r, c)))
    }
}

/// Index range `[center - radius, center + radius]` clamped to `[0, len)`
#[inline]
pub fn clamped_span(center: usize, radius: usize, len: usize) -> Range<usize> {
    center.saturating_sub(radius)..(center + radius + 1).min(len)
}
