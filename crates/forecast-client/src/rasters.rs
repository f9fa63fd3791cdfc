//! GeoTIFF payload fetch.

use async_trait::async_trait;
use bytes::Bytes;
use forecast_common::{NetworkError, NetworkResult, OverlaySource};
use map_view::RasterSource;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::client::{check_status, transport};

/// `GET` the overlay URL and hand back the raw body.
#[derive(Debug, Clone)]
pub struct HttpRasterSource {
    client: Client,
}

impl HttpRasterSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl RasterSource for HttpRasterSource {
    #[instrument(skip(self, source), fields(url = %source.url))]
    async fn fetch(&self, source: &OverlaySource) -> NetworkResult<Bytes> {
        let response = self.client.get(&source.url).send().await.map_err(transport)?;
        let response = check_status(response)?;
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::malformed(format!("failed to read raster body: {}", e)))?;

        debug!(bytes = body.len(), "Fetched raster");
        Ok(body)
    }
}
