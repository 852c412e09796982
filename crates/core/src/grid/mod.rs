//! Elevation grid data structures

mod bbox;
mod elevation;
mod neighborhood;

pub use bbox::BoundingBox;
pub use elevation::{ElevationGrid, GridStatistics, MIN_DIMENSION};
pub use neighborhood::{clamped_span, neighbor_distance, offset_cell, Window, NEIGHBORS_8};
