//! Shared HTTP client construction and error mapping.

use std::time::Duration;

use forecast_common::{NetworkError, NetworkResult};
use reqwest::{Client, Response};
use thiserror::Error;

use crate::plots::PlotClient;
use crate::rasters::HttpRasterSource;
use crate::stats::StatsClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Connection settings for the forecast service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// One connection pool shared by the raster, statistics and plot clients.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rasters(&self) -> HttpRasterSource {
        HttpRasterSource::new(self.client.clone())
    }

    pub fn stats(&self) -> StatsClient {
        StatsClient::new(self.client.clone(), &self.base_url)
    }

    pub fn plots(&self) -> PlotClient {
        PlotClient::new(self.client.clone(), &self.base_url)
    }
}

/// Map a send error onto the transport variant.
pub(crate) fn transport(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::transport(format!("timed out: {}", err))
    } else {
        NetworkError::transport(err.to_string())
    }
}

/// Reject non-2xx responses.
pub(crate) fn check_status(response: Response) -> NetworkResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(NetworkError::Status {
            status: status.as_u16(),
        })
    }
}
