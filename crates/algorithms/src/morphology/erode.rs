//! Morphological erosion (minimum filter)
//!
//! Replaces each cell with the minimum value in its square window.
//! Shrinks bright regions and enlarges dark regions.

use cumbre_core::grid::ElevationGrid;
use cumbre_core::{Algorithm, Error, Result};

use super::window::{separable_filter, SquareWindow};

/// Parameters for morphological erosion
#[derive(Debug, Clone, Default)]
pub struct ErodeParams {
    pub window: SquareWindow,
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = ElevationGrid;
    type Output = ElevationGrid;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Morphological erosion (minimum filter over a square window)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode(&input, params.window)
    }
}

/// Perform morphological erosion on a grid
///
/// Each output cell is the minimum within the window centered on it. Border
/// cells use the part of the window that lies inside the grid.
pub fn erode(grid: &ElevationGrid, window: SquareWindow) -> Result<ElevationGrid> {
    separable_filter(grid, window, f64::min)
}
