//! Single-grid terrain analysis
//!
//! ```text
//! grid -> canopy filter -> peak detector -> shape + prominence -> classifier
//! ```
//!
//! The run is call-and-return: the input grid is never modified and nothing
//! is kept between calls. Shape and prominence are computed per peak, in
//! parallel when the `parallel` feature is on; the entity list keeps the
//! detector's order (highest peak first).

use std::time::Instant;

use tracing::{debug, info};

use super::config::PipelineConfig;
use crate::maybe_rayon::*;
use crate::terrain::{
    analyze_shape, canopy_filter, classify, detect_peaks, estimate_prominence, Coordinates,
    LandformEntity, PeakCandidate,
};
use cumbre_core::grid::{BoundingBox, ElevationGrid};
use cumbre_core::{Algorithm, ElevationProvider, Error, Result};

/// Full terrain analysis as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct TerrainAnalysis;

impl Algorithm for TerrainAnalysis {
    type Input = ElevationGrid;
    type Output = Vec<LandformEntity>;
    type Params = PipelineConfig;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Terrain Analysis"
    }

    fn description(&self) -> &'static str {
        "Filter canopy, detect peaks and classify them as hills, mountains or volcanoes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        analyze_terrain(&input, &params)
    }
}

fn describe_peak(
    bare_earth: &ElevationGrid,
    peak: &PeakCandidate,
    config: &PipelineConfig,
) -> Result<Option<LandformEntity>> {
    let shape = analyze_shape(bare_earth, peak, bare_earth.cell_size(), &config.shape)?;
    let prominence = estimate_prominence(bare_earth, peak, config.prominence.search_radius)?;

    let landform = classify(peak.elevation, prominence, &shape, config.biome, &config.classifier);
    Ok(landform.map(|landform| LandformEntity {
        landform,
        coordinates: Coordinates { x: peak.x, y: peak.y },
        altitude: config.classifier.bare_earth_elevation(peak.elevation, config.biome),
        prominence,
        shape,
    }))
}

/// Classify the landforms of one elevation grid
///
/// The configuration is validated before any stage runs; an invalid
/// parameter stops the run with no partial result.
pub fn analyze_terrain(grid: &ElevationGrid, config: &PipelineConfig) -> Result<Vec<LandformEntity>> {
    config.validate()?;
    let start = Instant::now();

    let bare_earth = canopy_filter(grid, config.canopy.window_size)?;
    let peaks = detect_peaks(&bare_earth, &config.peaks)?;

    let described: Vec<Result<Option<LandformEntity>>> = peaks
        .into_par_iter()
        .map(|peak| describe_peak(&bare_earth, &peak, config))
        .collect();

    let mut entities = Vec::with_capacity(described.len());
    let mut unclassified = 0usize;
    for entry in described {
        match entry? {
            Some(entity) => entities.push(entity),
            None => unclassified += 1,
        }
    }
    debug!(unclassified, "Peaks dropped as noise or flat terrain");

    info!(
        rows = grid.rows(),
        cols = grid.cols(),
        biome = %config.biome,
        landforms = entities.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Terrain analysis complete"
    );
    Ok(entities)
}

/// Fetch the grid for `bbox` from a provider, then analyze it
pub fn analyze_region<P>(
    provider: &P,
    bbox: &BoundingBox,
    config: &PipelineConfig,
) -> Result<Vec<LandformEntity>>
where
    P: ElevationProvider + ?Sized,
{
    config.validate()?;
    debug!(provider = provider.name(), %bbox, "Requesting elevation grid");
    let grid = provider.elevation_grid(bbox)?;
    analyze_terrain(&grid, config)
}
