//! Square structuring element for morphological operations
//!
//! Only flat square windows are used: they are separable, so a min/max filter
//! of side `w` costs two 1-D passes of `w` comparisons per cell instead of
//! `w²`. Near the grid border the window is clamped to the cells that exist.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::maybe_rayon::*;
use cumbre_core::grid::{clamped_span, ElevationGrid};
use cumbre_core::{Error, Result};

/// Square window of odd side length, centered on the cell being filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct SquareWindow(usize);

impl SquareWindow {
    /// Create a window of the given side; must be odd and at least 3
    pub fn new(size: usize) -> Result<Self> {
        if size < 3 || size % 2 == 0 {
            return Err(Error::invalid_parameter(
                "window_size",
                size,
                "window size must be odd and at least 3",
            ));
        }
        Ok(Self(size))
    }

    /// Side length in cells
    pub fn size(&self) -> usize {
        self.0
    }

    /// Cells on each side of the center
    pub fn radius(&self) -> usize {
        self.0 / 2
    }
}

impl Default for SquareWindow {
    fn default() -> Self {
        SquareWindow(3)
    }
}

impl TryFrom<usize> for SquareWindow {
    type Error = Error;

    fn try_from(size: usize) -> Result<Self> {
        SquareWindow::new(size)
    }
}

impl From<SquareWindow> for usize {
    fn from(w: SquareWindow) -> usize {
        w.0
    }
}

/// Apply a separable rank filter (`pick` is `f64::min` or `f64::max`) over a
/// clamped square window: first along each row, then along each column.
pub(crate) fn separable_filter(
    grid: &ElevationGrid,
    window: SquareWindow,
    pick: fn(f64, f64) -> f64,
) -> Result<ElevationGrid> {
    let (rows, cols) = grid.shape();
    let radius = window.radius();
    let src = grid.view();

    let horizontal: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let line = src.row(row);
            (0..cols)
                .map(|col| {
                    clamped_span(col, radius, cols)
                        .map(|c| line[c])
                        .fold(line[col], pick)
                })
                .collect::<Vec<f64>>()
        })
        .collect();
    let horizontal = Array2::from_shape_vec((rows, cols), horizontal)
        .map_err(|e| Error::Other(e.to_string()))?;

    let output: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let span = clamped_span(row, radius, rows);
            (0..cols)
                .map(|col| {
                    span.clone()
                        .map(|r| horizontal[(r, col)])
                        .fold(horizontal[(row, col)], pick)
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    let output = Array2::from_shape_vec((rows, cols), output)
        .map_err(|e| Error::Other(e.to_string()))?;
    grid.with_same_meta(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_validation() {
        assert!(SquareWindow::new(3).is_ok());
        assert!(SquareWindow::new(7).is_ok());
        assert!(SquareWindow::new(1).is_err());
        assert!(SquareWindow::new(4).is_err());
        assert!(SquareWindow::new(0).is_err());
    }

    #[test]
    fn test_radius() {
        assert_eq!(SquareWindow::new(3).unwrap().radius(), 1);
        assert_eq!(SquareWindow::new(9).unwrap().radius(), 4);
        assert_eq!(SquareWindow::default().size(), 3);
    }

    #[test]
    fn test_separable_matches_brute_force() {
        let data = Array2::from_shape_fn((9, 11), |(r, c)| ((r * 37 + c * 91) % 23) as f64);
        let grid = ElevationGrid::from_array(data.clone(), 1.0).unwrap();
        let window = SquareWindow::new(5).unwrap();
        let result = separable_filter(&grid, window, f64::min).unwrap();

        for r in 0..9 {
            for c in 0..11 {
                let mut expected = f64::INFINITY;
                for rr in clamped_span(r, 2, 9) {
                    for cc in clamped_span(c, 2, 11) {
                        expected = expected.min(data[(rr, cc)]);
                    }
                }
                assert_eq!(result.value(r, c), expected, "mismatch at ({}, {})", r, c);
            }
        }
    }
}
