//! Mathematical morphology over elevation grids
//!
//! - **Erosion**: minimum filter (shrinks bright regions)
//! - **Dilation**: maximum filter (expands bright regions)
//! - **Opening**: erosion then dilation (removes small bright features)
//!
//! All operations use a flat square window clamped at the grid border.

mod dilate;
mod erode;
mod opening;
mod window;

pub use dilate::{dilate, Dilate, DilateParams};
pub use erode::{erode, Erode, ErodeParams};
pub use opening::{opening, Opening, OpeningParams};
pub use window::SquareWindow;
