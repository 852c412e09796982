//! Local shape of a peak candidate
//!
//! Two descriptors are computed from the 3x3 neighborhood of the candidate:
//!
//! - the central-difference gradient
//!   ```text
//!   dz/dx = (z[x+1, y] - z[x-1, y]) / (2 * cell_size)
//!   dz/dy = (z[x, y+1] - z[x, y-1]) / (2 * cell_size)
//!   |grad| = sqrt(dz/dx² + dz/dy²)
//!   ```
//! - the average slope: the angle `atan(|Δz| / distance)` to each of the 8
//!   neighbors (distance = cell size, or cell size * √2 on diagonals),
//!   averaged, in degrees.
//!
//! A candidate is called conical when its average slope falls inside a band
//! (20°–45° by default): steep enough to look like a cone, not so steep that it
//! is more likely a cliff or a data artifact. This is a coarse signal taken
//! from one ring of neighbors. It does not look for craters, summit rings or
//! radial symmetry, and a steep-sided mesa edge can pass as well.
//!
//! The slope is measured over a single cell, so the band depends on grid
//! resolution. The same cone reads steeper on a finer grid: a 2500 m Gaussian
//! cone with a 5-cell radius averages about 34° at 90 m cells but about 48° at
//! 30 m cells, where it falls outside the default band and is classified as a
//! mountain. Retune `conical_min_degrees` / `conical_max_degrees` together
//! with the cell size.

use serde::{Deserialize, Serialize};

use super::peaks::PeakCandidate;
use cumbre_core::grid::{neighbor_distance, offset_cell, ElevationGrid, NEIGHBORS_8};
use cumbre_core::{Error, Result};

/// Central-difference gradient at one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub dz_dx: f64,
    pub dz_dy: f64,
    pub magnitude: f64,
}

/// Local geometric descriptor of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeSignal {
    pub average_slope_degrees: f64,
    pub is_conical: bool,
    /// Rise over run of the central-difference gradient
    pub gradient_magnitude: f64,
}

/// Slope band that counts as conical
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    pub conical_min_degrees: f64,
    pub conical_max_degrees: f64,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            conical_min_degrees: 20.0,
            conical_max_degrees: 45.0,
        }
    }
}

impl ShapeParams {
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = (self.conical_min_degrees, self.conical_max_degrees);
        let in_range = |v: f64| (0.0..=90.0).contains(&v);
        if !in_range(lo) || !in_range(hi) || lo > hi {
            return Err(Error::invalid_parameter(
                "conical_band",
                format!("[{}, {}]", lo, hi),
                "band must satisfy 0 <= min <= max <= 90 degrees",
            ));
        }
        Ok(())
    }

    /// Whether an average slope lies inside the band (inclusive)
    pub fn is_conical(&self, average_slope_degrees: f64) -> bool {
        average_slope_degrees >= self.conical_min_degrees
            && average_slope_degrees <= self.conical_max_degrees
    }
}

fn require_interior(grid: &ElevationGrid, x: usize, y: usize) -> Result<()> {
    if !grid.is_interior(y, x) {
        return Err(Error::invalid_parameter(
            "candidate",
            format!("({}, {})", x, y),
            "shape analysis needs all 8 neighbors inside the grid",
        ));
    }
    Ok(())
}

fn validate_cell_size(cell_size: f64) -> Result<()> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(Error::invalid_parameter(
            "cell_size",
            cell_size,
            "cell size must be positive",
        ));
    }
    Ok(())
}

/// Central-difference gradient at column `x`, row `y`
pub fn gradient_at(grid: &ElevationGrid, x: usize, y: usize, cell_size: f64) -> Result<Gradient> {
    validate_cell_size(cell_size)?;
    require_interior(grid, x, y)?;

    let dz_dx = (grid.value(y, x + 1) - grid.value(y, x - 1)) / (2.0 * cell_size);
    let dz_dy = (grid.value(y + 1, x) - grid.value(y - 1, x)) / (2.0 * cell_size);
    Ok(Gradient {
        dz_dx,
        dz_dy,
        magnitude: (dz_dx * dz_dx + dz_dy * dz_dy).sqrt(),
    })
}

/// Mean angle in degrees between a cell and its 8 neighbors
pub fn average_slope_degrees(grid: &ElevationGrid, x: usize, y: usize, cell_size: f64) -> Result<f64> {
    validate_cell_size(cell_size)?;
    require_interior(grid, x, y)?;

    let z = grid.value(y, x);
    let total: f64 = NEIGHBORS_8
        .iter()
        .filter_map(|&(dr, dc)| {
            let (row, col) = offset_cell(y, x, dr, dc, grid.shape())?;
            let run = neighbor_distance(dr, dc) * cell_size;
            Some(((z - grid.value(row, col)).abs() / run).atan().to_degrees())
        })
        .sum();
    Ok(total / NEIGHBORS_8.len() as f64)
}

/// Describe the shape of the terrain around a candidate
///
/// # Arguments
/// * `grid` - Grid the candidate was found on
/// * `candidate` - Interior cell to describe
/// * `cell_size` - Meters per cell
/// * `params` - Conical slope band
pub fn analyze_shape(
    grid: &ElevationGrid,
    candidate: &PeakCandidate,
    cell_size: f64,
    params: &ShapeParams,
) -> Result<ShapeSignal> {
    params.validate()?;
    let gradient = gradient_at(grid, candidate.x, candidate.y, cell_size)?;
    let slope = average_slope_degrees(grid, candidate.x, candidate.y, cell_size)?;
    Ok(ShapeSignal {
        average_slope_degrees: slope,
        is_conical: params.is_conical(slope),
        gradient_magnitude: gradient.magnitude,
    })
}
