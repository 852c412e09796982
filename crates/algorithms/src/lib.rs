//! # Cumbre Algorithms
//!
//! Terrain intelligence over elevation grids.
//!
//! ## Modules
//!
//! - **morphology**: erosion, dilation and opening over a clamped square window
//! - **terrain**: canopy filter, peak detector, shape analyzer, prominence
//!   estimator and landform classifier
//! - **pipeline**: configuration and end-to-end runs over one or many grids

pub mod maybe_rayon;
pub mod morphology;
pub mod pipeline;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::morphology::{dilate, erode, opening, SquareWindow};
    pub use crate::pipeline::{
        analyze_batch, analyze_grids, analyze_region, analyze_terrain, CancelToken,
        PipelineConfig, TerrainAnalysis,
    };
    pub use crate::terrain::{
        analyze_shape, canopy_filter, classify, detect_peaks, estimate_prominence, Biome,
        ClassifierThresholds, LandformEntity, LandformType, PeakCandidate, ShapeSignal,
    };
    pub use cumbre_core::prelude::*;
}
