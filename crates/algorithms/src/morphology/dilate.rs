//! Morphological dilation (maximum filter)
//!
//! Replaces each cell with the maximum value in its square window.
//! Enlarges bright regions and shrinks dark regions.

use cumbre_core::grid::ElevationGrid;
use cumbre_core::{Algorithm, Error, Result};

use super::window::{separable_filter, SquareWindow};

/// Parameters for morphological dilation
#[derive(Debug, Clone, Default)]
pub struct DilateParams {
    pub window: SquareWindow,
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = ElevationGrid;
    type Output = ElevationGrid;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Morphological dilation (maximum filter over a square window)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, params.window)
    }
}

/// Perform morphological dilation on a grid
///
/// Each output cell is the maximum within the window centered on it, clamped
/// at the grid border like [`erode`](super::erode).
pub fn dilate(grid: &ElevationGrid, window: SquareWindow) -> Result<ElevationGrid> {
    separable_filter(grid, window, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(rows: usize, cols: usize, row: usize, col: usize) -> ElevationGrid {
        let mut data = ndarray::Array2::from_elem((rows, cols), 1.0);
        data[(row, col)] = 9.0;
        ElevationGrid::from_array(data, 1.0).unwrap()
    }

    #[test]
    fn test_dilate_spreads_maximum() {
        let result = dilate(&spike(7, 7, 3, 3), SquareWindow::default()).unwrap();
        for r in 2..=4 {
            for c in 2..=4 {
                assert_eq!(result.value(r, c), 9.0, "({}, {}) should see the spike", r, c);
            }
        }
        assert_eq!(result.value(1, 3), 1.0);
        assert_eq!(result.value(3, 5), 1.0);
    }

    #[test]
    fn test_dilate_corner() {
        let result = dilate(&spike(6, 6, 0, 0), SquareWindow::new(5).unwrap()).unwrap();
        assert_eq!(result.value(2, 2), 9.0);
        assert_eq!(result.value(3, 0), 1.0);
    }

    #[test]
    fn test_dilate_algorithm_trait() {
        let params = DilateParams {
            window: SquareWindow::new(5).unwrap(),
        };
        let result = Dilate.execute(spike(9, 9, 4, 4), params).unwrap();
        assert_eq!(result.value(2, 6), 9.0);
        assert_eq!(result.value(1, 4), 1.0);
    }
}
