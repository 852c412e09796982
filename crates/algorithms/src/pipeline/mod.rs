//! End-to-end terrain analysis
//!
//! [`analyze_terrain`] runs every stage over one grid, [`analyze_region`]
//! fetches the grid from a provider first, and [`analyze_batch`] /
//! [`analyze_grids`] process independent inputs in parallel.

mod analysis;
mod batch;
mod config;

pub use analysis::{analyze_region, analyze_terrain, TerrainAnalysis};
pub use batch::{analyze_batch, analyze_grids, CancelToken};
pub use config::PipelineConfig;
