//! Morphological opening (erosion followed by dilation)
//!
//! Removes bright features narrower than the window (noise, spikes) while
//! preserving the shape of larger bright regions.

use cumbre_core::grid::ElevationGrid;
use cumbre_core::{Algorithm, Error, Result};

use super::dilate::dilate;
use super::erode::erode;
use super::window::SquareWindow;

/// Parameters for morphological opening
#[derive(Debug, Clone, Default)]
pub struct OpeningParams {
    pub window: SquareWindow,
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = ElevationGrid;
    type Output = ElevationGrid;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Morphological opening (erosion then dilation) to remove small bright features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        opening(&input, params.window)
    }
}

/// Perform morphological opening on a grid
///
/// Opening = erode then dilate with the same window. Every output cell lies
/// between the minimum and the maximum of its input window, never exceeds the
/// input cell, and re-opening with the same window changes nothing.
pub fn opening(grid: &ElevationGrid, window: SquareWindow) -> Result<ElevationGrid> {
    let eroded = erode(grid, window)?;
    dilate(&eroded, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn make_grid(rows: usize, cols: usize, value: f64) -> Array2<f64> {
        Array2::from_elem((rows, cols), value)
    }

    #[test]
    fn test_opening_uniform() {
        let grid = ElevationGrid::from_array(make_grid(11, 11, 5.0), 1.0).unwrap();
        let result = opening(&grid, SquareWindow::default()).unwrap();
        assert_eq!(result, grid);
    }

    #[test]
    fn test_opening_removes_bright_spot() {
        let mut data = make_grid(11, 11, 5.0);
        data[(5, 5)] = 100.0;
        let grid = ElevationGrid::from_array(data, 1.0).unwrap();

        let result = opening(&grid, SquareWindow::default()).unwrap();
        assert!(
            (result.value(5, 5) - 5.0).abs() < 1e-10,
            "Opening should remove single bright pixel, got {}",
            result.value(5, 5)
        );
    }

    #[test]
    fn test_opening_preserves_large_bright_region() {
        let mut data = make_grid(11, 11, 5.0);
        for r in 4..7 {
            for c in 4..7 {
                data[(r, c)] = 100.0;
            }
        }
        let grid = ElevationGrid::from_array(data, 1.0).unwrap();

        let result = opening(&grid, SquareWindow::default()).unwrap();
        for r in 4..7 {
            for c in 4..7 {
                assert_eq!(result.value(r, c), 100.0, "block cell ({}, {}) lost", r, c);
            }
        }
        assert_eq!(result.value(3, 5), 5.0);
    }

    #[test]
    fn test_opening_keeps_border_cells() {
        let mut data = make_grid(8, 8, 5.0);
        data[(0, 0)] = 50.0;
        let grid = ElevationGrid::from_array(data, 1.0).unwrap();
        let result = opening(&grid, SquareWindow::default()).unwrap();
        // Corner spike narrower than the window is removed, border stays finite
        assert_eq!(result.value(0, 0), 5.0);
        assert!(result.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_opening_idempotent() {
        let data = Array2::from_shape_fn((15, 13), |(r, c)| ((r * 17 + c * 29) % 31) as f64);
        let grid = ElevationGrid::from_array(data, 1.0).unwrap();
        let once = opening(&grid, SquareWindow::new(5).unwrap()).unwrap();
        let twice = opening(&once, SquareWindow::new(5).unwrap()).unwrap();
        assert_eq!(once, twice);
    }
}
