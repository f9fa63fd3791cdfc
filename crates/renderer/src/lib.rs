//! Rendering for forecast raster overlays.
//!
//! - Fixed, versioned color ramp and value classification
//! - Painting a decoded grid into an RGBA overlay layer
//! - PNG encoding (indexed or RGBA)
//! - Legend derived from the ramp

pub mod legend;
pub mod overlay;
pub mod png;
pub mod ramp;

pub use legend::{Legend, LegendEntry};
pub use overlay::{paint, OverlayLayer};
pub use png::PngError;
pub use ramp::{ColorRamp, ColorStop, RampError, RampSpec, PRECIPITATION_RAMP};
