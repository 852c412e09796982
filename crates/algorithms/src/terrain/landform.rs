//! Rule-based landform classification
//!
//! Each accepted peak is assigned one category from its elevation, prominence
//! and shape. Rules are evaluated in order and the first match wins:
//!
//! | Order | Type     | Rule                                                    |
//! |-------|----------|---------------------------------------------------------|
//! | 1     | Volcano  | elevation > 2000 m AND prominence > 500 m AND conical   |
//! | 2     | Mountain | prominence >= 300 m OR elevation > 1000 m               |
//! | 3     | Hill     | 20 m < prominence < 300 m                               |
//! | 4     | none     | noise or flat terrain                                   |
//!
//! In the jungle biome a constant canopy height (30 m by default) is first
//! subtracted from the elevation. All limits live in [`ClassifierThresholds`]
//! and can be tuned per region.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::shape::ShapeSignal;
use cumbre_core::{Error, Result};

/// Landform category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandformType {
    Hill,
    Mountain,
    Volcano,
}

impl fmt::Display for LandformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandformType::Hill => "hill",
            LandformType::Mountain => "mountain",
            LandformType::Volcano => "volcano",
        };
        f.write_str(name)
    }
}

/// Dominant vegetation regime of the analyzed region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Jungle,
    #[default]
    Andean,
    Temperate,
    Arid,
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Biome::Jungle => "jungle",
            Biome::Andean => "andean",
            Biome::Temperate => "temperate",
            Biome::Arid => "arid",
        };
        f.write_str(name)
    }
}

impl FromStr for Biome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jungle" => Ok(Biome::Jungle),
            "andean" => Ok(Biome::Andean),
            "temperate" => Ok(Biome::Temperate),
            "arid" => Ok(Biome::Arid),
            other => Err(Error::invalid_parameter(
                "biome",
                other,
                "expected one of jungle, andean, temperate, arid",
            )),
        }
    }
}

/// Classification limits, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub volcano_min_elevation: f64,
    pub volcano_min_prominence: f64,
    pub mountain_min_prominence: f64,
    pub mountain_min_elevation: f64,
    pub hill_min_prominence: f64,
    pub hill_max_prominence: f64,
    /// Average canopy height removed in the jungle biome
    pub jungle_canopy_offset: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            volcano_min_elevation: 2000.0,
            volcano_min_prominence: 500.0,
            mountain_min_prominence: 300.0,
            mountain_min_elevation: 1000.0,
            hill_min_prominence: 20.0,
            hill_max_prominence: 300.0,
            jungle_canopy_offset: 30.0,
        }
    }
}

impl ClassifierThresholds {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("volcano_min_elevation", self.volcano_min_elevation),
            ("volcano_min_prominence", self.volcano_min_prominence),
            ("mountain_min_prominence", self.mountain_min_prominence),
            ("mountain_min_elevation", self.mountain_min_elevation),
            ("hill_min_prominence", self.hill_min_prominence),
            ("hill_max_prominence", self.hill_max_prominence),
            ("jungle_canopy_offset", self.jungle_canopy_offset),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_parameter(
                    name,
                    value,
                    "threshold must be finite and non-negative",
                ));
            }
        }
        if self.hill_min_prominence >= self.hill_max_prominence {
            return Err(Error::invalid_parameter(
                "hill_min_prominence",
                self.hill_min_prominence,
                format!("must be below hill_max_prominence ({})", self.hill_max_prominence),
            ));
        }
        Ok(())
    }

    /// Vegetation height removed from raw elevation for a biome
    pub fn canopy_offset(&self, biome: Biome) -> f64 {
        match biome {
            Biome::Jungle => self.jungle_canopy_offset,
            Biome::Andean | Biome::Temperate | Biome::Arid => 0.0,
        }
    }

    /// Raw elevation with the biome's canopy offset removed
    pub fn bare_earth_elevation(&self, elevation: f64, biome: Biome) -> f64 {
        elevation - self.canopy_offset(biome)
    }
}

/// Assign a landform category, or `None` for noise and flat terrain.
///
/// `elevation` is the raw peak elevation; the biome offset is applied here.
pub fn classify(
    elevation: f64,
    prominence: f64,
    shape: &ShapeSignal,
    biome: Biome,
    thresholds: &ClassifierThresholds,
) -> Option<LandformType> {
    let t = thresholds;
    let elevation = t.bare_earth_elevation(elevation, biome);

    if elevation > t.volcano_min_elevation && prominence > t.volcano_min_prominence && shape.is_conical {
        Some(LandformType::Volcano)
    } else if prominence >= t.mountain_min_prominence || elevation > t.mountain_min_elevation {
        Some(LandformType::Mountain)
    } else if prominence > t.hill_min_prominence && prominence < t.hill_max_prominence {
        Some(LandformType::Hill)
    } else {
        None
    }
}

/// Grid position of an entity (`x` = column, `y` = row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: usize,
    pub y: usize,
}

/// A classified peak, ready for map annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandformEntity {
    #[serde(rename = "type")]
    pub landform: LandformType,
    pub coordinates: Coordinates,
    /// Bare-earth elevation in meters (biome offset removed)
    pub altitude: f64,
    /// Local prominence estimate in meters
    pub prominence: f64,
    pub shape: ShapeSignal,
}
