//! Procedural terrain for development and tests
//!
//! The generated surface is the sum of
//! - a base elevation with a linear slope along the columns,
//! - an optional Gaussian cone ("volcano"),
//! - an optional ridge running along one grid axis,
//! - independent uniform noise per cell standing in for vegetation canopy.
//!
//! Feature placement and heights are parameters; only the noise is random, and
//! it becomes reproducible once a seed is set.

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::ElevationProvider;
use crate::error::{Error, Result};
use crate::grid::{BoundingBox, ElevationGrid};

/// Gaussian bump `peak_height * exp(-d² / (2 * radius²))` centered on a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeFeature {
    /// Column of the summit
    pub x: f64,
    /// Row of the summit
    pub y: f64,
    /// Height above the surrounding surface, meters
    pub peak_height: f64,
    /// Radius of influence in cells (standard deviation of the bump)
    pub radius: f64,
}

/// Axis a ridge runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RidgeAxis {
    /// Ridge crest follows a row (runs west to east)
    Row,
    /// Ridge crest follows a column (runs north to south)
    Column,
}

/// Gaussian cross-section ridge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RidgeFeature {
    pub axis: RidgeAxis,
    /// Row (for [`RidgeAxis::Row`]) or column index of the crest
    pub position: f64,
    /// Crest height above the surrounding surface, meters
    pub height: f64,
    /// Cross-section standard deviation in cells
    pub width: f64,
}

/// Uniform per-cell noise in `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseRange {
    pub min: f64,
    pub max: f64,
}

impl Default for NoiseRange {
    fn default() -> Self {
        Self { min: 0.0, max: 15.0 }
    }
}

/// Synthetic terrain generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticTerrain {
    pub rows: usize,
    pub cols: usize,
    /// Meters per cell
    pub cell_size: f64,
    /// Elevation of the surface at column 0, meters
    pub base_elevation: f64,
    /// Rise per column, meters
    pub base_slope: f64,
    pub cone: Option<ConeFeature>,
    pub ridge: Option<RidgeFeature>,
    pub noise: NoiseRange,
    /// Fixed seed for reproducible noise; fresh entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SyntheticTerrain {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 100,
            cell_size: 90.0,
            base_elevation: 30.0,
            base_slope: 0.5,
            cone: Some(ConeFeature {
                x: 30.0,
                y: 30.0,
                peak_height: 2500.0,
                radius: 5.0,
            }),
            ridge: Some(RidgeFeature {
                axis: RidgeAxis::Row,
                position: 75.0,
                height: 400.0,
                width: 3.0,
            }),
            noise: NoiseRange::default(),
            seed: None,
        }
    }
}

impl SyntheticTerrain {
    /// A flat surface of the given size with nothing on it
    pub fn flat(rows: usize, cols: usize, cell_size: f64, elevation: f64) -> Self {
        Self {
            rows,
            cols,
            cell_size,
            base_elevation: elevation,
            base_slope: 0.0,
            cone: None,
            ridge: None,
            noise: NoiseRange {
                min: 0.0,
                max: 0.0,
            },
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let NoiseRange { min, max } = self.noise;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::invalid_parameter(
                "noise",
                format!("[{}, {})", min, max),
                "noise range must be finite with min <= max",
            ));
        }
        if let Some(cone) = &self.cone {
            if !cone.radius.is_finite() || cone.radius <= 0.0 || !cone.peak_height.is_finite() {
                return Err(Error::invalid_parameter(
                    "cone.radius",
                    cone.radius,
                    "cone radius must be positive and height finite",
                ));
            }
        }
        if let Some(ridge) = &self.ridge {
            if !ridge.width.is_finite() || ridge.width <= 0.0 || !ridge.height.is_finite() {
                return Err(Error::invalid_parameter(
                    "ridge.width",
                    ridge.width,
                    "ridge width must be positive and height finite",
                ));
            }
        }
        Ok(())
    }

    /// Noise-free surface height at (row, col)
    pub fn structural_height(&self, row: usize, col: usize) -> f64 {
        let (y, x) = (row as f64, col as f64);
        let mut z = self.base_elevation + self.base_slope * x;

        if let Some(cone) = &self.cone {
            let d2 = (x - cone.x).powi(2) + (y - cone.y).powi(2);
            z += cone.peak_height * (-d2 / (2.0 * cone.radius * cone.radius)).exp();
        }

        if let Some(ridge) = &self.ridge {
            let across = match ridge.axis {
                RidgeAxis::Row => y - ridge.position,
                RidgeAxis::Column => x - ridge.position,
            };
            z += ridge.height * (-(across * across) / (2.0 * ridge.width * ridge.width)).exp();
        }

        z
    }

    /// Build the grid
    pub fn generate(&self) -> Result<ElevationGrid> {
        self.validate()?;
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let NoiseRange { min, max } = self.noise;

        // Noise is drawn in raster order so a seed always maps to the same surface
        let data = Array2::from_shape_fn((self.rows, self.cols), |(row, col)| {
            let noise = if max > min { rng.gen_range(min..max) } else { min };
            self.structural_height(row, col) + noise
        });
        ElevationGrid::from_array(data, self.cell_size)
    }
}

impl ElevationProvider for SyntheticTerrain {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn elevation_grid(&self, bbox: &BoundingBox) -> Result<ElevationGrid> {
        bbox.validate()?;
        Ok(self.generate()?.with_bbox(*bbox))
    }
}
