//! Elevation providers
//!
//! A provider turns a geographic bounding box into an [`ElevationGrid`].
//! Providers never fabricate samples: an area they cannot cover yields
//! [`Error::NoElevationData`](crate::Error::NoElevationData), not a zero-filled grid.

mod synthetic;
mod terrain_rgb;

pub use synthetic::{ConeFeature, NoiseRange, RidgeAxis, RidgeFeature, SyntheticTerrain};
pub use terrain_rgb::{
    decode_rgb_image, decode_rgb_tile, decode_terrain_rgb, ground_resolution, lonlat_to_tile,
    DirectoryTileSource, MemoryTileSource, TerrainRgbProvider, TileId, TileRange, TileSource,
    EARTH_CIRCUMFERENCE_M, TERRAIN_RGB_BASE, TERRAIN_RGB_SCALE,
};

use crate::error::Result;
use crate::grid::{BoundingBox, ElevationGrid};

/// Source of elevation grids for geographic areas
pub trait ElevationProvider {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Elevation samples covering `bbox`
    fn elevation_grid(&self, bbox: &BoundingBox) -> Result<ElevationGrid>;
}
