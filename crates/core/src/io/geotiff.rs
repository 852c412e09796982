//! Single-band GeoTIFF DEM reading/writing
//!
//! Uses the `tiff` crate directly. Only the tags needed to recover a cell size
//! are interpreted (ModelPixelScale, ModelTiepoint, GDAL_NODATA); projection
//! keys are ignored.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

use crate::error::{Error, Result};
use crate::grid::ElevationGrid;

/// Read a DEM from a GeoTIFF file.
///
/// `cell_size` overrides the pixel scale stored in the file, which is needed
/// for geographic (degree-based) rasters since the pipeline works in meters.
pub fn read_geotiff<P: AsRef<Path>>(path: P, cell_size: Option<f64>) -> Result<ElevationGrid> {
    let file = File::open(path.as_ref())?;
    decode_geotiff(file, cell_size)
}

/// Read a DEM from an in-memory GeoTIFF
pub fn read_geotiff_from_buffer(data: &[u8], cell_size: Option<f64>) -> Result<ElevationGrid> {
    decode_geotiff(Cursor::new(data), cell_size)
}

fn decode_geotiff<R>(reader: R, cell_size: Option<f64>) -> Result<ElevationGrid>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let nodata = decoder
        .find_tag(Tag::GdalNodata)
        .map_err(|e| Error::Other(format!("Cannot read nodata tag: {}", e)))?
        .map(|value| value.into_string())
        .transpose()
        .map_err(|e| Error::Other(format!("Malformed nodata tag: {}", e)))?
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok());
    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)
        .map_err(|e| Error::Other(format!("Cannot read pixel scale tag: {}", e)))?
        .map(|value| value.into_f64_vec())
        .transpose()
        .map_err(|e| Error::Other(format!("Malformed pixel scale tag: {}", e)))?
        .filter(|s| s.len() >= 2);

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<f64> = match result {
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        _ => return Err(Error::Other("Unsupported TIFF pixel format".to_string())),
    };

    if data.len() != rows * cols {
        return Err(Error::invalid_grid(format!(
            "expected {} single-band samples, found {}",
            rows * cols,
            data.len()
        )));
    }

    // Holes in the DEM are missing data, not elevations
    let holes = data
        .iter()
        .filter(|&&v| !v.is_finite() || nodata.is_some_and(|nd| v == nd || v as f32 == nd as f32))
        .count();
    if holes > 0 {
        return Err(Error::no_data(format!(
            "{} of {} cells are nodata",
            holes,
            data.len()
        )));
    }

    let cell_size = match (cell_size, scale) {
        (Some(size), _) => size,
        (None, Some(scale)) => scale[0].abs(),
        (None, None) => {
            return Err(Error::invalid_parameter(
                "cell_size",
                "none",
                "file has no pixel scale tag; pass a cell size in meters",
            ))
        }
    };

    ElevationGrid::from_vec(data, rows, cols, cell_size)
}

/// Write a DEM to a GeoTIFF file as 32-bit float
pub fn write_geotiff<P: AsRef<Path>>(grid: &ElevationGrid, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_geotiff(grid, file)
}

/// Write a DEM to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer(grid: &ElevationGrid) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(grid, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<W>(grid: &ElevationGrid, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = grid.shape();
    let data: Vec<f32> = grid.data().iter().map(|&v| v as f32).collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let size = grid.cell_size();
    let scale = vec![size, size, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let (origin_x, origin_y) = grid
        .bbox()
        .map_or((0.0, 0.0), |b| (b.west, b.north));
    let tiepoint = vec![0.0, 0.0, 0.0, origin_x, origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // GTModelTypeGeoKey=1 (Projected), GTRasterTypeGeoKey=1 (PixelIsArea)
    let geokeys: Vec<u16> = vec![1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
