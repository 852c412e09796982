//! Geographic bounding boxes

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A geographic extent in decimal degrees (WGS84).
///
/// Boxes crossing the antimeridian are not supported: `west` must be less
/// than `east`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Check that the box is finite, non-degenerate and on the globe
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.north, self.south, self.east, self.west];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_parameter(
                "bbox",
                self,
                "bounds must be finite",
            ));
        }
        if self.north > 90.0 || self.south < -90.0 || self.east > 180.0 || self.west < -180.0 {
            return Err(Error::invalid_parameter(
                "bbox",
                self,
                "bounds outside [-90, 90] latitude or [-180, 180] longitude",
            ));
        }
        if self.north <= self.south || self.east <= self.west {
            return Err(Error::invalid_parameter(
                "bbox",
                self,
                "north must exceed south and east must exceed west",
            ));
        }
        Ok(())
    }

    /// Center as (longitude, latitude)
    pub fn center(&self) -> (f64, f64) {
        (
            (self.east + self.west) / 2.0,
            (self.north + self.south) / 2.0,
        )
    }

    pub fn width_degrees(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_degrees(&self) -> f64 {
        self.north - self.south
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[N {:.6}, S {:.6}, E {:.6}, W {:.6}]",
            self.north, self.south, self.east, self.west
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(-33.0, -34.0, -70.0, -71.0);
        let (lon, lat) = bbox.center();
        assert_relative_eq!(lon, -70.5, epsilon = 1e-12);
        assert_relative_eq!(lat, -33.5, epsilon = 1e-12);
        assert!(bbox.validate().is_ok());
    }

    #[test]
    fn test_degenerate_rejected() {
        assert!(BoundingBox::new(10.0, 10.0, 5.0, 4.0).validate().is_err());
        assert!(BoundingBox::new(10.0, 9.0, 4.0, 5.0).validate().is_err());
        assert!(BoundingBox::new(95.0, 9.0, 5.0, 4.0).validate().is_err());
        assert!(BoundingBox::new(f64::NAN, 9.0, 5.0, 4.0).validate().is_err());
    }
}
