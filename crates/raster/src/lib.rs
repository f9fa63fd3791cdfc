//! Raster decoding for forecast overlays.
//!
//! Turns a fetched GeoTIFF payload into an immutable [`RasterGrid`]: bounds,
//! resolution, per-cell values and the declared no-data marker.

pub mod error;
pub mod geotiff;
pub mod grid;

pub use error::{DecodeError, Result};
pub use geotiff::{decode, GeoTransform};
pub use grid::RasterGrid;
