//! Terrain stages
//!
//! - Canopy filter: approximate bare earth by morphological opening
//! - Peaks: local maxima reduced to well-separated summits
//! - Shape: gradient and average slope around a summit
//! - Prominence: local-window prominence estimate
//! - Landform: rule-based hill / mountain / volcano classification

mod canopy;
mod landform;
mod peaks;
mod prominence;
mod shape;

pub use canopy::{canopy_filter, CanopyFilter, CanopyParams};
pub use landform::{
    classify, Biome, ClassifierThresholds, Coordinates, LandformEntity, LandformType,
};
pub use peaks::{
    deduplicate_peaks, detect_peaks, find_local_maxima, PeakCandidate, PeakDetector, PeakParams,
};
pub use prominence::{estimate_prominence, ProminenceParams};
pub use shape::{
    analyze_shape, average_slope_degrees, gradient_at, Gradient, ShapeParams, ShapeSignal,
};
