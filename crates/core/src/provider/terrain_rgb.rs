//! Terrain-RGB raster tiles
//!
//! Elevation is packed into the three 8-bit color channels of a Web Mercator
//! tile and recovered with
//!
//! ```text
//! height = -10000 + (R * 65536 + G * 256 + B) * 0.1
//! ```
//!
//! which gives 0.1 m vertical resolution over roughly -10 km .. +1667 km.
//! The decode is reproduced exactly so that tiles from any terrain-RGB
//! producer yield the same elevations here.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use image::RgbImage;
use ndarray::{s, Array2};
use tracing::debug;

use super::ElevationProvider;
use crate::error::{Error, Result};
use crate::grid::{BoundingBox, ElevationGrid, MIN_DIMENSION};

/// Height encoded by the all-zero pixel
pub const TERRAIN_RGB_BASE: f64 = -10_000.0;
/// Meters per encoded step
pub const TERRAIN_RGB_SCALE: f64 = 0.1;
/// Equatorial circumference used for Web Mercator ground resolution
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
/// Latitude limit of the Web Mercator projection
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Decode one terrain-RGB pixel to meters
#[inline]
pub fn decode_terrain_rgb(r: u8, g: u8, b: u8) -> f64 {
    let code = (r as u32) * 65_536 + (g as u32) * 256 + b as u32;
    TERRAIN_RGB_BASE + code as f64 * TERRAIN_RGB_SCALE
}

/// Decode every pixel of an RGB image, rows top to bottom
pub fn decode_rgb_image(img: &RgbImage) -> Array2<f64> {
    let (w, h) = img.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        let [r, g, b] = img.get_pixel(col as u32, row as u32).0;
        decode_terrain_rgb(r, g, b)
    })
}

/// Decode an encoded tile (PNG or WebP) into elevations
pub fn decode_rgb_tile(bytes: &[u8]) -> Result<Array2<f64>> {
    let img = image::load_from_memory(bytes)?.to_rgb8();
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::Image("tile has no pixels".into()));
    }
    Ok(decode_rgb_image(&img))
}

/// Address of a Web Mercator (slippy map) tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Fractional tile coordinates of a longitude/latitude at zoom `z`
pub fn lonlat_to_tile(lon: f64, lat: f64, z: u8) -> (f64, f64) {
    let n = (1u64 << z) as f64;
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n;
    (x, y)
}

/// Ground distance covered by one pixel at a latitude and zoom
pub fn ground_resolution(lat: f64, z: u8, tile_size: u32) -> f64 {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    EARTH_CIRCUMFERENCE_M * lat.cos() / (tile_size as f64 * (1u64 << z) as f64)
}

/// Inclusive tile index ranges covering a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u8,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl TileRange {
    pub fn covering(bbox: &BoundingBox, z: u8) -> Self {
        let last = ((1u64 << z) - 1) as u32;
        let (x0, y0) = lonlat_to_tile(bbox.west, bbox.north, z);
        let (x1, y1) = lonlat_to_tile(bbox.east, bbox.south, z);
        let index = |v: f64| (v.floor().max(0.0) as u32).min(last);
        Self {
            z,
            x_min: index(x0),
            // An east edge exactly on a tile boundary does not pull in the next tile
            x_max: index((x1 - 1e-9).max(x0)),
            y_min: index(y0),
            y_max: index((y1 - 1e-9).max(y0)),
        }
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tiles in raster order (north to south, west to east)
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        (self.y_min..=self.y_max)
            .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TileId::new(self.z, x, y)))
    }
}

/// Somewhere encoded terrain-RGB tiles can be read from.
///
/// `Ok(None)` means the source has no tile at that address; it is not an error
/// by itself, but a provider will refuse to fill the gap.
pub trait TileSource: Send + Sync {
    fn fetch(&self, tile: TileId) -> Result<Option<Vec<u8>>>;
}

/// Tiles laid out on disk as `{root}/{z}/{x}/{y}.{extension}`
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    root: PathBuf,
    extension: String,
}

impl DirectoryTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "png".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_path(&self, tile: TileId) -> PathBuf {
        self.root
            .join(tile.z.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.{}", tile.y, self.extension))
    }
}

impl TileSource for DirectoryTileSource {
    fn fetch(&self, tile: TileId) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.tile_path(tile)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory tile store, mostly for tests and for callers that fetch tiles
/// themselves (e.g. over HTTP) before running the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSource {
    tiles: HashMap<TileId, Vec<u8>>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tile: TileId, bytes: Vec<u8>) {
        self.tiles.insert(tile, bytes);
    }
}

impl TileSource for MemoryTileSource {
    fn fetch(&self, tile: TileId) -> Result<Option<Vec<u8>>> {
        Ok(self.tiles.get(&tile).cloned())
    }
}

/// Elevation provider backed by terrain-RGB tiles at a fixed zoom level
pub struct TerrainRgbProvider<S: TileSource> {
    source: S,
    zoom: u8,
    max_tiles: usize,
}

impl<S: TileSource> TerrainRgbProvider<S> {
    /// Highest zoom level served by common terrain-RGB tilesets
    pub const MAX_ZOOM: u8 = 22;

    pub fn new(source: S, zoom: u8) -> Result<Self> {
        if zoom > Self::MAX_ZOOM {
            return Err(Error::invalid_parameter(
                "zoom",
                zoom,
                format!("zoom must be at most {}", Self::MAX_ZOOM),
            ));
        }
        Ok(Self {
            source,
            zoom,
            max_tiles: 64,
        })
    }

    /// Refuse requests that would need more than `max_tiles` tiles
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    fn fetch_decoded(&self, tile: TileId) -> Result<Array2<f64>> {
        let bytes = self
            .source
            .fetch(tile)?
            .ok_or_else(|| Error::no_data(format!("tile {} is not available", tile)))?;
        decode_rgb_tile(&bytes)
    }
}

impl<S: TileSource> ElevationProvider for TerrainRgbProvider<S> {
    fn name(&self) -> &'static str {
        "terrain-rgb"
    }

    fn elevation_grid(&self, bbox: &BoundingBox) -> Result<ElevationGrid> {
        bbox.validate()?;
        let range = TileRange::covering(bbox, self.zoom);
        if range.len() > self.max_tiles {
            return Err(Error::invalid_parameter(
                "bbox",
                bbox,
                format!(
                    "needs {} tiles at zoom {}, limit is {}",
                    range.len(),
                    self.zoom,
                    self.max_tiles
                ),
            ));
        }
        debug!(zoom = self.zoom, tiles = range.len(), %bbox, "Fetching terrain-RGB tiles");

        let mut tile_size: Option<usize> = None;
        let mut mosaic = Array2::<f64>::zeros((0, 0));

        for tile in range.tiles() {
            let decoded = self.fetch_decoded(tile)?;
            let (h, w) = decoded.dim();
            if h != w {
                return Err(Error::Image(format!("tile {} is {}x{}, expected square", tile, w, h)));
            }
            let size = match tile_size {
                Some(size) => size,
                None => {
                    mosaic = Array2::zeros((range.height() as usize * h, range.width() as usize * w));
                    tile_size = Some(h);
                    h
                }
            };
            if h != size {
                return Err(Error::Image(format!(
                    "tile {} is {}px, expected {}px like its neighbors",
                    tile, h, size
                )));
            }
            let r0 = (tile.y - range.y_min) as usize * size;
            let c0 = (tile.x - range.x_min) as usize * size;
            mosaic
                .slice_mut(s![r0..r0 + size, c0..c0 + size])
                .assign(&decoded);
        }

        let size = tile_size.ok_or_else(|| Error::no_data("no tiles cover the bounding box"))?;

        // Crop the mosaic to the pixels actually inside the box
        let (fx0, fy0) = lonlat_to_tile(bbox.west, bbox.north, self.zoom);
        let (fx1, fy1) = lonlat_to_tile(bbox.east, bbox.south, self.zoom);
        let px = |f: f64, origin: u32| (f - origin as f64) * size as f64;
        let (rows, cols) = mosaic.dim();
        let c_start = (px(fx0, range.x_min).floor().max(0.0) as usize).min(cols);
        let c_end = (px(fx1, range.x_min).ceil().max(0.0) as usize).clamp(c_start, cols);
        let r_start = (px(fy0, range.y_min).floor().max(0.0) as usize).min(rows);
        let r_end = (px(fy1, range.y_min).ceil().max(0.0) as usize).clamp(r_start, rows);
        let (crop_rows, crop_cols) = (r_end - r_start, c_end - c_start);
        if crop_rows < MIN_DIMENSION || crop_cols < MIN_DIMENSION {
            return Err(Error::invalid_parameter(
                "zoom",
                self.zoom,
                format!(
                    "{} covers only {}x{} pixels; use a higher zoom or a larger box",
                    bbox, crop_rows, crop_cols
                ),
            ));
        }
        let cropped = mosaic.slice(s![r_start..r_end, c_start..c_end]).to_owned();

        let (_, center_lat) = bbox.center();
        let cell_size = ground_resolution(center_lat, self.zoom, size as u32);
        Ok(ElevationGrid::from_array(cropped, cell_size)?.with_bbox(*bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    /// Inverse of the decode, for building fixture tiles
    fn encode(height: f64) -> [u8; 3] {
        let code = ((height - TERRAIN_RGB_BASE) / TERRAIN_RGB_SCALE).round() as u32;
        [(code >> 16) as u8, (code >> 8) as u8, code as u8]
    }

    fn png_tile(size: u32, height: impl Fn(u32, u32) -> f64) -> Vec<u8> {
        let img = RgbImage::from_fn(size, size, |x, y| Rgb(encode(height(x, y))));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_extremes() {
        assert_eq!(decode_terrain_rgb(0, 0, 0), -10000.0);
        assert_eq!(
            decode_terrain_rgb(255, 255, 255),
            -10000.0 + (16777215.0 * 0.1)
        );
    }

    #[test]
    fn test_decode_known_heights() {
        // 100000 steps above the base = 0 m
        assert_relative_eq!(decode_terrain_rgb(1, 134, 160), 0.0, epsilon = 1e-9);
        // Aconcagua summit, 6961.0 m
        let [r, g, b] = encode(6961.0);
        assert_relative_eq!(decode_terrain_rgb(r, g, b), 6961.0, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_png_tile() {
        let bytes = png_tile(4, |x, y| (x * 10 + y) as f64);
        let grid = decode_rgb_tile(&bytes).unwrap();
        assert_eq!(grid.dim(), (4, 4));
        assert_relative_eq!(grid[(2, 3)], 32.0, epsilon = 1e-6);
        assert_relative_eq!(grid[(0, 0)], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_rgb_tile(b"not an image").unwrap_err();
        assert!(matches!(err, Error::Image(_)), "got {:?}", err);
    }

    #[test]
    fn test_lonlat_to_tile() {
        let (x, y) = lonlat_to_tile(0.0, 0.0, 1);
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
        let (x, _) = lonlat_to_tile(-180.0, 0.0, 3);
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ground_resolution_equator() {
        let res = ground_resolution(0.0, 0, 256);
        assert_relative_eq!(res, 156_543.033_9, epsilon = 1e-3);
        assert!(ground_resolution(60.0, 0, 256) < res);
    }

    #[test]
    fn test_tile_range_single_tile() {
        let (lon0, lat0) = (10.0, 10.0);
        let bbox = BoundingBox::new(lat0 + 0.01, lat0, lon0 + 0.01, lon0);
        let range = TileRange::covering(&bbox, 8);
        assert_eq!(range.len(), 1);
        let tiles: Vec<_> = range.tiles().collect();
        let (fx, fy) = lonlat_to_tile(lon0, lat0, 8);
        assert_eq!(tiles[0], TileId::new(8, fx as u32, fy as u32));
    }

    #[test]
    fn test_tile_range_world() {
        let bbox = BoundingBox::new(85.0, -85.0, 180.0, -180.0);
        let range = TileRange::covering(&bbox, 1);
        assert_eq!((range.width(), range.height()), (2, 2));
    }

    #[test]
    fn test_provider_missing_tile_is_no_data() {
        let provider = TerrainRgbProvider::new(MemoryTileSource::new(), 10).unwrap();
        let bbox = BoundingBox::new(-33.40, -33.45, -70.55, -70.60);
        let err = provider.elevation_grid(&bbox).unwrap_err();
        assert!(err.is_no_data(), "expected no-data, got {:?}", err);
    }

    #[test]
    fn test_provider_mosaic_and_crop() {
        let z = 2;
        // Spans two tiles west to east at zoom 2
        let bbox = BoundingBox::new(60.0, 1.0, -1.0, -170.0);
        let range = TileRange::covering(&bbox, z);

        let mut source = MemoryTileSource::new();
        for tile in range.tiles() {
            let base = (tile.x * 1000 + tile.y * 100) as f64;
            source.insert(tile, png_tile(16, move |_, _| base));
        }
        let provider = TerrainRgbProvider::new(source, z).unwrap();
        let grid = provider.elevation_grid(&bbox).unwrap();

        assert_eq!(grid.bbox(), Some(&bbox));
        assert!(grid.rows() <= range.height() as usize * 16);
        assert!(grid.cols() <= range.width() as usize * 16);
        assert!(grid.cell_size() > 0.0);
        // North-west corner comes from the first tile
        let first = range.tiles().next().unwrap();
        assert_relative_eq!(
            grid.value(0, 0),
            (first.x * 1000 + first.y * 100) as f64,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_provider_box_too_small_for_zoom() {
        let z = 2;
        let bbox = BoundingBox::new(10.01, 10.0, 10.01, 10.0);
        let mut source = MemoryTileSource::new();
        for tile in TileRange::covering(&bbox, z).tiles() {
            source.insert(tile, png_tile(16, |_, _| 500.0));
        }
        let provider = TerrainRgbProvider::new(source, z).unwrap();
        let err = provider.elevation_grid(&bbox).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "zoom", .. }), "got {:?}", err);
    }

    #[test]
    fn test_provider_tile_limit() {
        let provider = TerrainRgbProvider::new(MemoryTileSource::new(), 12)
            .unwrap()
            .with_max_tiles(4);
        let bbox = BoundingBox::new(-30.0, -35.0, -68.0, -72.0);
        let err = provider.elevation_grid(&bbox).unwrap_err();
        assert!(err.is_bad_input(), "got {:?}", err);
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryTileSource::new(dir.path());
        let tile = TileId::new(3, 2, 5);
        assert!(source.fetch(tile).unwrap().is_none());

        let path = source.tile_path(tile);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, png_tile(4, |_, _| 500.0)).unwrap();
        let bytes = source.fetch(tile).unwrap().unwrap();
        let grid = decode_rgb_tile(&bytes).unwrap();
        assert_relative_eq!(grid[(1, 1)], 500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zoom_limit() {
        assert!(TerrainRgbProvider::new(MemoryTileSource::new(), 23).is_err());
    }
}
