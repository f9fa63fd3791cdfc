//! Error types for raster decoding.

use thiserror::Error;

/// Errors that can occur while turning a fetched payload into a [`RasterGrid`](crate::RasterGrid).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The payload is not a readable TIFF.
    #[error("malformed TIFF payload: {0}")]
    Malformed(String),

    /// The image has zero width or height.
    #[error("raster has no cells ({width}x{height})")]
    Empty { width: u32, height: u32 },

    /// A required GeoTIFF tag is absent.
    #[error("missing georeferencing tag: {0}")]
    MissingGeoreference(&'static str),

    /// GeoTIFF tags are present but describe an unusable grid.
    #[error("invalid georeferencing: {0}")]
    InvalidGeoreference(String),

    /// Header dimensions disagree with the number of decoded samples.
    #[error("header declares {expected} cells but payload holds {actual} samples")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl DecodeError {
    /// Create a Malformed error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create an InvalidGeoreference error.
    pub fn invalid_georeference(msg: impl Into<String>) -> Self {
        Self::InvalidGeoreference(msg.into())
    }
}

impl From<tiff::TiffError> for DecodeError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<forecast_common::BoundsError> for DecodeError {
    fn from(err: forecast_common::BoundsError) -> Self {
        Self::InvalidGeoreference(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
