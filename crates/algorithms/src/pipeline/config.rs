//! Pipeline tuning
//!
//! Every stage reads its parameters from one [`PipelineConfig`], passed
//! explicitly so regions with different tuning can run side by side. Each
//! section falls back to its defaults when absent from a TOML file:
//!
//! ```toml
//! biome = "jungle"
//!
//! [canopy]
//! window_size = 5
//!
//! [classifier]
//! hill_min_prominence = 15.0
//! ```

use serde::{Deserialize, Serialize};

use crate::terrain::{Biome, CanopyParams, ClassifierThresholds, PeakParams, ProminenceParams, ShapeParams};
use cumbre_core::Result;

/// All parameters of one terrain analysis run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub biome: Biome,
    pub canopy: CanopyParams,
    pub peaks: PeakParams,
    pub shape: ShapeParams,
    pub prominence: ProminenceParams,
    pub classifier: ClassifierThresholds,
}

impl PipelineConfig {
    pub fn with_biome(mut self, biome: Biome) -> Self {
        self.biome = biome;
        self
    }

    /// Check every section; the first violation is returned
    pub fn validate(&self) -> Result<()> {
        self.canopy.window()?;
        self.peaks.validate()?;
        self.shape.validate()?;
        self.prominence.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}
