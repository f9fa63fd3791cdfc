//! Common types shared across the forecast map viewer crates.

pub mod bounds;
pub mod color;
pub mod error;
pub mod sample;
pub mod selection;
pub mod stats;

pub use bounds::{BoundsError, GeoBounds, LatLng};
pub use color::Color;
pub use error::{NetworkError, NetworkResult};
pub use sample::Sample;
pub use selection::{
    Month, OverlaySource, Period, Season, Selection, SelectionError, SubmitRequest,
};
pub use stats::{ModelStats, StatField, StatResult, NO_DATA_LABEL};
