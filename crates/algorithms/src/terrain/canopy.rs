//! Canopy filter: approximate bare earth by morphological opening
//!
//! Vegetation shows up in a DEM as narrow upward spikes sitting on the ground
//! surface. Opening the grid (erosion, then dilation, with the same square
//! window) removes any upward feature whose footprint is smaller than the
//! window while keeping features wider than it, such as ridges and cones.
//!
//! This rests on an assumption that must be tuned per dataset: tree crowns are
//! smaller in footprint than the real terrain features at the chosen grid
//! resolution. With coarse cells (a crown inside one cell) a 3x3 window is
//! enough; with fine cells a crown spans several samples and needs a wider
//! window, which in turn starts flattening small knolls. There is no window
//! size that is right everywhere.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::morphology::{opening, SquareWindow};
use cumbre_core::grid::ElevationGrid;
use cumbre_core::{Algorithm, Error, Result};

/// Parameters for the canopy filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyParams {
    /// Side of the square window in cells (odd, >= 3)
    pub window_size: usize,
}

impl Default for CanopyParams {
    fn default() -> Self {
        Self { window_size: 3 }
    }
}

impl CanopyParams {
    pub fn window(&self) -> Result<SquareWindow> {
        SquareWindow::new(self.window_size)
    }
}

/// Canopy filter algorithm
#[derive(Debug, Clone, Default)]
pub struct CanopyFilter;

impl Algorithm for CanopyFilter {
    type Input = ElevationGrid;
    type Output = ElevationGrid;
    type Params = CanopyParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Canopy Filter"
    }

    fn description(&self) -> &'static str {
        "Suppress vegetation spikes narrower than the window to approximate bare earth"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        canopy_filter(&input, params.window_size)
    }
}

/// Filter a raw DEM towards bare earth
///
/// # Arguments
/// * `grid` - Raw elevation grid (surface model)
/// * `window_size` - Side of the square window in cells; odd and at least 3
///
/// # Returns
/// A new grid of the same shape with canopy spikes removed
pub fn canopy_filter(grid: &ElevationGrid, window_size: usize) -> Result<ElevationGrid> {
    let window = SquareWindow::new(window_size)?;
    let filtered = opening(grid, window)?;
    debug!(
        window_size,
        rows = grid.rows(),
        cols = grid.cols(),
        "Canopy filter applied"
    );
    Ok(filtered)
}
