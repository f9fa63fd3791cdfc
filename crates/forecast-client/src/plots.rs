//! Plot generation (`POST /submit`).

use forecast_common::selection::join_url;
use forecast_common::{NetworkError, NetworkResult, SubmitRequest};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::client::{check_status, transport};

/// Reply from `/submit`. The service reports script failures in-band with
/// `success: false` and a 200 status.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub plots: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub returncode: Option<i32>,
}

impl SubmitResponse {
    /// First produced plot that is a GeoTIFF.
    pub fn raster_plot(&self) -> Option<&str> {
        self.plots
            .iter()
            .map(String::as_str)
            .find(|p| {
                let p = p.to_ascii_lowercase();
                p.ends_with(".tif") || p.ends_with(".tiff")
            })
    }
}

#[derive(Debug, Clone)]
pub struct PlotClient {
    client: Client,
    base_url: String,
}

impl PlotClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    #[instrument(skip(self, request), fields(region = %request.region, model = %request.model))]
    pub async fn submit(&self, request: &SubmitRequest) -> NetworkResult<SubmitResponse> {
        let response = self
            .client
            .post(join_url(&self.base_url, "/submit"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response)?;
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::malformed(e.to_string()))?;
        let reply: SubmitResponse = serde_json::from_str(&body)?;

        if reply.success {
            info!(plots = reply.plots.len(), "Plot generation finished");
        } else {
            warn!(error = reply.error.as_deref().unwrap_or(""), "Plot generation failed");
        }
        Ok(reply)
    }

    /// Absolute URL for a plot path returned by [`submit`](Self::submit).
    pub fn plot_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}
