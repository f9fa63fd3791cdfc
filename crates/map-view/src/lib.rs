//! Forecast map view core.
//!
//! A [`MapSession`] owns the map surface for its lifetime and coordinates two
//! components that share a single UI task:
//!
//! - [`OverlayManager`]: fetches, decodes and paints the raster for a
//!   selection and keeps at most one overlay attached (last request wins).
//! - [`PointQueryController`]: answers clicks with a statistics popup (last
//!   click wins), reading the active grid but never mutating it.
//!
//! The surface itself is the [`MapSurface`] trait; [`HeadlessSurface`] records
//! everything and backs the command-line viewer and the tests.

pub mod error;
pub mod overlay;
pub mod popup;
pub mod query;
pub mod session;
pub mod sources;
pub mod surface;
pub mod versioned;

pub use error::OverlayError;
pub use overlay::{ActiveGrid, OverlayConfig, OverlayHandle, OverlayManager, OverlayOutcome, OverlayPhase};
pub use popup::{Popup, PopupContent};
pub use query::{LookupMode, PendingQuery, PointQueryController, QueryOutcome, QueryStatus};
pub use session::{EventOutcome, MapEvent, MapSession, SessionConfig};
pub use sources::{RasterSource, StatsLookup};
pub use surface::{HeadlessSurface, LayerId, MapSurface, SurfaceEvent};
pub use versioned::{Ticket, VersionGate};
