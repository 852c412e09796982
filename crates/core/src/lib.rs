//! # Cumbre Core
//!
//! Core types, traits and I/O for the cumbre terrain analysis library.
//!
//! This crate provides:
//! - `ElevationGrid`: validated, immutable grid of elevation samples
//! - `BoundingBox`: geographic extent of a request
//! - Elevation providers (terrain-RGB tiles, synthetic terrain)
//! - GeoTIFF DEM I/O
//! - Algorithm trait for consistent API

pub mod error;
pub mod grid;
pub mod io;
pub mod provider;

pub use error::{Error, Result};
pub use grid::{BoundingBox, ElevationGrid};
pub use provider::ElevationProvider;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::{BoundingBox, ElevationGrid};
    pub use crate::provider::{ElevationProvider, SyntheticTerrain, TerrainRgbProvider};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in cumbre.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
