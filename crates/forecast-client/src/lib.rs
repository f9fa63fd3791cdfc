//! HTTP clients for the forecast service.
//!
//! [`HttpRasterSource`] and [`StatsClient`] implement the `map-view` source
//! traits; [`PlotClient`] drives plot generation ahead of an overlay load.
//! Every failure is reported as a [`NetworkError`](forecast_common::NetworkError)
//! and nothing is retried.

mod client;
mod plots;
mod rasters;
mod stats;

pub use client::{ClientConfig, ClientError, ForecastClient};
pub use plots::{PlotClient, SubmitResponse};
pub use rasters::HttpRasterSource;
pub use stats::{StatsClient, StatsRequest};
