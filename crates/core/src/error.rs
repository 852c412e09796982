//! Error types for cumbre

use thiserror::Error;

/// Main error type for cumbre operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Grid rejected before any stage runs (ragged, too small, empty, non-finite)
    #[error("Invalid elevation grid: {reason}")]
    InvalidGrid { reason: String },

    /// A provider could not resolve the requested area to elevation samples
    #[error("No elevation data: {reason}")]
    NoElevationData { reason: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A batch was stopped before this grid was processed
    #[error("Cancelled")]
    Cancelled,

    #[error("Image decode error: {0}")]
    Image(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_grid(reason: impl Into<String>) -> Self {
        Error::InvalidGrid {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::NoElevationData`]
    pub fn no_data(reason: impl Into<String>) -> Self {
        Error::NoElevationData {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::InvalidParameter`]
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the area simply has no data (show an empty-region indicator).
    pub fn is_no_data(&self) -> bool {
        matches!(self, Error::NoElevationData { .. })
    }

    /// True when the caller supplied a bad grid or bad tuning (show a configuration warning).
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Error::InvalidGrid { .. } | Error::InvalidParameter { .. })
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

/// Result type alias for cumbre operations
pub type Result<T> = std::result::Result<T, Error>;
