//! Point statistics lookup (`POST /stats`).

use async_trait::async_trait;
use forecast_common::selection::join_url;
use forecast_common::{LatLng, NetworkError, NetworkResult, StatResult};
use map_view::StatsLookup;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::client::{check_status, transport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsRequest {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for StatsRequest {
    fn from(at: LatLng) -> Self {
        Self {
            lat: at.lat,
            lng: at.lng,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    url: String,
}

impl StatsClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: join_url(base_url, "/stats"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl StatsLookup for StatsClient {
    #[instrument(skip(self, at), fields(lat = at.lat, lng = at.lng))]
    async fn lookup(&self, at: LatLng) -> NetworkResult<StatResult> {
        let response = self
            .client
            .post(&self.url)
            .json(&StatsRequest::from(at))
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response)?;
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::malformed(e.to_string()))?;

        let result = StatResult::from_json(&body)?;
        debug!(models = result.len(), "Statistics received");
        Ok(result)
    }
}
