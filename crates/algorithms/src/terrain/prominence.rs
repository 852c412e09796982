//! Local prominence estimate
//!
//! **This is not topographic prominence.** True prominence is the height a
//! peak must descend, along the best possible route, before climbing to any
//! higher ground; computing it means finding the key saddle to the nearest
//! higher peak anywhere in the dataset, which is a global graph problem.
//!
//! Here a square window of `search_radius` cells around the candidate is
//! examined instead:
//!
//! - if any cell in the window is strictly higher than the candidate, the
//!   candidate is a shoulder of a larger feature and gets prominence 0;
//! - otherwise prominence is the candidate elevation minus the lowest
//!   elevation in the window.
//!
//! Values will not match authoritative prominence datasets. Summits whose key
//! saddle lies outside the window are overstated (the window floor is usually
//! lower than the saddle), and peaks dominated by higher ground just outside
//! the window are never zeroed. A larger radius sees farther at a cost that
//! grows with the square of the radius.

use serde::{Deserialize, Serialize};

use super::peaks::PeakCandidate;
use cumbre_core::grid::{ElevationGrid, Window};
use cumbre_core::{Error, Result};

/// Parameters for the prominence estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProminenceParams {
    /// Half-width of the square search window, in cells
    pub search_radius: usize,
}

impl Default for ProminenceParams {
    fn default() -> Self {
        Self { search_radius: 15 }
    }
}

impl ProminenceParams {
    pub fn validate(&self) -> Result<()> {
        if self.search_radius == 0 {
            return Err(Error::invalid_parameter(
                "search_radius",
                self.search_radius,
                "search radius must be at least 1 cell",
            ));
        }
        Ok(())
    }
}

/// Height drop from a candidate to the floor of its search window, in meters
///
/// Returns 0 when anything in the window is higher than the candidate. The
/// window is clamped at the grid border.
pub fn estimate_prominence(
    grid: &ElevationGrid,
    candidate: &PeakCandidate,
    search_radius: usize,
) -> Result<f64> {
    ProminenceParams { search_radius }.validate()?;
    if candidate.y >= grid.rows() || candidate.x >= grid.cols() {
        return Err(Error::invalid_parameter(
            "candidate",
            format!("({}, {})", candidate.x, candidate.y),
            format!("outside {}x{} grid", grid.rows(), grid.cols()),
        ));
    }

    let window = Window::clamped(candidate.y, candidate.x, search_radius, grid.shape());
    let mut floor = candidate.elevation;
    for (row, col) in window.cells() {
        let z = grid.value(row, col);
        if z > candidate.elevation {
            return Ok(0.0);
        }
        floor = floor.min(z);
    }
    Ok(candidate.elevation - floor)
}
