//! Main elevation grid type

use crate::error::{Error, Result};
use crate::grid::BoundingBox;
use ndarray::{Array2, ArrayView2};

/// Smallest number of rows or columns for which interior-cell algorithms
/// (3x3 neighborhoods) have at least one cell to work on.
pub const MIN_DIMENSION: usize = 3;

/// A rectangular grid of elevation samples in meters.
///
/// Samples are stored in a single row-major `Array2` (row, col), so every row
/// has the same length by construction. Grids are validated on creation and
/// immutable afterwards: pipeline stages build a new grid with
/// [`ElevationGrid::with_same_meta`] instead of mutating their input.
///
/// Throughout the crate `x` is the column index and `y` the row index.
///
/// # Example
///
/// ```ignore
/// use cumbre_core::ElevationGrid;
///
/// let grid = ElevationGrid::from_rows(
///     vec![
///         vec![1.0, 2.0, 1.0],
///         vec![2.0, 5.0, 2.0],
///         vec![1.0, 2.0, 1.0],
///     ],
///     30.0,
/// )?;
/// assert_eq!(grid.value(1, 1), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    /// Elevation samples in row-major order (row, col)
    data: Array2<f64>,
    /// Ground distance between adjacent samples, in meters
    cell_size: f64,
    /// Geographic extent, when the grid came from a georeferenced source
    bbox: Option<BoundingBox>,
}

impl ElevationGrid {
    /// Create a grid from an ndarray
    pub fn from_array(data: Array2<f64>, cell_size: f64) -> Result<Self> {
        validate_cell_size(cell_size)?;
        validate_samples(&data)?;
        Ok(Self {
            data,
            cell_size,
            bbox: None,
        })
    }

    /// Create a grid from row-major samples
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize, cell_size: f64) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::invalid_grid(format!(
                "{} samples cannot fill a {}x{} grid",
                data.len(),
                rows,
                cols
            )));
        }
        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::invalid_grid(e.to_string()))?;
        Self::from_array(array, cell_size)
    }

    /// Create a grid from nested rows, rejecting ragged input
    pub fn from_rows(rows: Vec<Vec<f64>>, cell_size: f64) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(Error::invalid_grid(format!(
                "row {} has {} samples, expected {}",
                i,
                row.len(),
                n_cols
            )));
        }
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        Self::from_vec(data, n_rows, n_cols, cell_size)
    }

    /// Create a grid filled with a single elevation
    pub fn filled(rows: usize, cols: usize, value: f64, cell_size: f64) -> Result<Self> {
        Self::from_array(Array2::from_elem((rows, cols), value), cell_size)
    }

    /// Attach a geographic extent
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Build a new grid that shares this grid's cell size and extent.
    ///
    /// The new samples must have the same shape as the current ones.
    pub fn with_same_meta(&self, data: Array2<f64>) -> Result<Self> {
        if data.dim() != self.data.dim() {
            let (er, ec) = self.data.dim();
            let (ar, ac) = data.dim();
            return Err(Error::invalid_grid(format!(
                "shape mismatch: expected {}x{}, got {}x{}",
                er, ec, ar, ac
            )));
        }
        validate_samples(&data)?;
        Ok(Self {
            data,
            cell_size: self.cell_size,
            bbox: self.bbox,
        })
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a validated grid; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether (row, col) has all 8 neighbors inside the grid
    pub fn is_interior(&self, row: usize, col: usize) -> bool {
        row >= 1 && col >= 1 && row + 1 < self.rows() && col + 1 < self.cols()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data.get((row, col)).copied().ok_or_else(|| {
            Error::invalid_parameter(
                "cell",
                format!("({}, {})", row, col),
                format!("outside {}x{} grid", self.rows(), self.cols()),
            )
        })
    }

    /// Value at (row, col). Panics when out of bounds; callers iterate within `shape()`.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the grid and return the underlying array
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    // Metadata

    /// Meters per sample
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Geographic extent, if known
    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    // Statistics

    /// Minimum, maximum and mean elevation
    pub fn statistics(&self) -> GridStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;

        for &v in self.data.iter() {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }

        GridStatistics {
            min,
            max,
            mean: sum / self.len() as f64,
        }
    }
}

/// Basic statistics for an elevation grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

fn validate_cell_size(cell_size: f64) -> Result<()> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(Error::invalid_parameter(
            "cell_size",
            cell_size,
            "cell size must be a positive number of meters",
        ));
    }
    Ok(())
}

fn validate_samples(data: &Array2<f64>) -> Result<()> {
    let (rows, cols) = data.dim();
    if data.is_empty() {
        return Err(Error::invalid_grid("grid is empty"));
    }
    if rows < MIN_DIMENSION || cols < MIN_DIMENSION {
        return Err(Error::invalid_grid(format!(
            "{}x{} grid is smaller than {}x{}",
            rows, cols, MIN_DIMENSION, MIN_DIMENSION
        )));
    }
    if let Some(((row, col), v)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(Error::invalid_grid(format!(
            "non-finite sample {} at ({}, {})",
            v, row, col
        )));
    }
    Ok(())
}
