//! Remote collaborators: where raster bytes and point statistics come from.
//!
//! The traits are `?Send`: implementations are driven from the single UI
//! task and may hold `Rc`/`RefCell` state.

use async_trait::async_trait;
use bytes::Bytes;
use forecast_common::{LatLng, NetworkResult, OverlaySource, StatResult};

/// Fetches the GeoTIFF payload for an overlay.
#[async_trait(?Send)]
pub trait RasterSource {
    async fn fetch(&self, source: &OverlaySource) -> NetworkResult<Bytes>;
}

/// Looks up per-model statistics at a coordinate.
#[async_trait(?Send)]
pub trait StatsLookup {
    async fn lookup(&self, at: LatLng) -> NetworkResult<StatResult>;
}
