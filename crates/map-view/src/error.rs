//! Error types for overlay loading.

use forecast_common::NetworkError;
use raster::DecodeError;
use thiserror::Error;

/// Why an overlay could not be attached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("failed to fetch raster: {0}")]
    Fetch(#[from] NetworkError),

    #[error("failed to decode raster: {0}")]
    Decode(#[from] DecodeError),

    #[error("raster worker failed: {0}")]
    Worker(String),
}

impl OverlayError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayError::Fetch(_) => "fetch",
            OverlayError::Decode(_) => "decode",
            OverlayError::Worker(_) => "worker",
        }
    }
}
