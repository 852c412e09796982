//! Many independent regions at once
//!
//! Each bounding box (or grid) is analyzed on its own with no shared mutable
//! state, so the work spreads across threads without locks. Every input gets
//! its own `Result`: a region without data does not affect the others.
//!
//! A [`CancelToken`] can stop a batch between grids. Grids already started
//! run to completion; the ones not yet started report [`Error::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::analysis::{analyze_region, analyze_terrain};
use super::config::PipelineConfig;
use crate::maybe_rayon::*;
use crate::terrain::LandformEntity;
use cumbre_core::grid::{BoundingBox, ElevationGrid};
use cumbre_core::{ElevationProvider, Error, Result};

/// Shared flag for stopping a batch between grids
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; grids not yet started are skipped
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Analyze every bounding box with the same provider and tuning
///
/// Results are returned in input order.
pub fn analyze_batch<P>(
    provider: &P,
    regions: &[BoundingBox],
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Vec<Result<Vec<LandformEntity>>>
where
    P: ElevationProvider + Sync + ?Sized,
{
    let results: Vec<Result<Vec<LandformEntity>>> = regions
        .into_par_iter()
        .map(|bbox| {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let result = analyze_region(provider, bbox, config);
            if let Err(e) = &result {
                if e.is_no_data() {
                    warn!(%bbox, error = %e, "No elevation data for region");
                }
            }
            result
        })
        .collect();

    log_summary(&results);
    results
}

/// Analyze already decoded grids, in input order
pub fn analyze_grids(
    grids: &[ElevationGrid],
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Vec<Result<Vec<LandformEntity>>> {
    let results: Vec<Result<Vec<LandformEntity>>> = grids
        .into_par_iter()
        .map(|grid| {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            analyze_terrain(grid, config)
        })
        .collect();

    log_summary(&results);
    results
}

fn log_summary(results: &[Result<Vec<LandformEntity>>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    let cancelled = results
        .iter()
        .filter(|r| matches!(r, Err(Error::Cancelled)))
        .count();
    let landforms: usize = results.iter().flatten().map(Vec::len).sum();
    info!(
        grids = results.len(),
        failed,
        cancelled,
        landforms,
        "Batch analysis complete"
    );
}
