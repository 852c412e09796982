//! Peak detection
//!
//! A cell is a candidate peak when it is greater than or equal to all 8 of its
//! neighbors and at least one neighbor is strictly lower (a flat patch has no
//! peak). Border cells are never candidates.
//!
//! Candidates that sit on the same summit or plateau are then reduced greedily:
//! highest first, a candidate is kept only if it is farther than
//! `min_separation` cells from every peak kept so far. Candidates of equal
//! elevation are considered in raster order (row by row, west to east), so the
//! outcome depends only on the grid.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::maybe_rayon::*;
use cumbre_core::grid::{ElevationGrid, NEIGHBORS_8};
use cumbre_core::{Algorithm, Error, Result};

/// A local maximum of the grid (`x` = column, `y` = row)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakCandidate {
    pub x: usize,
    pub y: usize,
    pub elevation: f64,
}

impl PeakCandidate {
    pub fn new(x: usize, y: usize, elevation: f64) -> Self {
        Self { x, y, elevation }
    }

    /// Euclidean distance in cells
    pub fn distance_to(&self, other: &PeakCandidate) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Parameters for peak detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Accepted peaks are strictly farther apart than this many cells
    pub min_separation: f64,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            min_separation: 10.0,
        }
    }
}

impl PeakParams {
    pub fn validate(&self) -> Result<()> {
        if !self.min_separation.is_finite() || self.min_separation <= 0.0 {
            return Err(Error::invalid_parameter(
                "min_separation",
                self.min_separation,
                "minimum separation must be a positive number of cells",
            ));
        }
        Ok(())
    }
}

/// Peak detection algorithm
#[derive(Debug, Clone, Default)]
pub struct PeakDetector;

impl Algorithm for PeakDetector {
    type Input = ElevationGrid;
    type Output = Vec<PeakCandidate>;
    type Params = PeakParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Peak Detector"
    }

    fn description(&self) -> &'static str {
        "Find local maxima and reduce plateaus to well-separated peaks"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        detect_peaks(&input, &params)
    }
}

/// All interior local maxima, in raster order
pub fn find_local_maxima(grid: &ElevationGrid) -> Vec<PeakCandidate> {
    let (rows, cols) = grid.shape();
    let view = grid.view();

    (1..rows - 1)
        .into_par_iter()
        .flat_map(|row| {
            let mut found = Vec::new();
            for col in 1..cols - 1 {
                let z = view[(row, col)];
                let mut any_lower = false;
                let mut is_max = true;
                for &(dr, dc) in &NEIGHBORS_8 {
                    let n = view[((row as isize + dr) as usize, (col as isize + dc) as usize)];
                    if n > z {
                        is_max = false;
                        break;
                    }
                    any_lower |= n < z;
                }
                if is_max && any_lower {
                    found.push(PeakCandidate::new(col, row, z));
                }
            }
            found
        })
        .collect()
}

/// Greedy spatial deduplication.
///
/// `candidates` must be in raster order; ties in elevation keep that order.
pub fn deduplicate_peaks(mut candidates: Vec<PeakCandidate>, min_separation: f64) -> Vec<PeakCandidate> {
    // Stable sort: equal elevations stay in raster order
    candidates.sort_by(|a, b| b.elevation.total_cmp(&a.elevation));

    let mut accepted: Vec<PeakCandidate> = Vec::new();
    for candidate in candidates {
        if accepted
            .iter()
            .all(|p| p.distance_to(&candidate) > min_separation)
        {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Find well-separated peaks, highest first
pub fn detect_peaks(grid: &ElevationGrid, params: &PeakParams) -> Result<Vec<PeakCandidate>> {
    params.validate()?;
    let candidates = find_local_maxima(grid);
    let found = candidates.len();
    let peaks = deduplicate_peaks(candidates, params.min_separation);
    debug!(
        candidates = found,
        accepted = peaks.len(),
        min_separation = params.min_separation,
        "Peak detection complete"
    );
    Ok(peaks)
}
