//! Popup content shown at a clicked coordinate.

use forecast_common::{LatLng, ModelStats, StatResult, NO_DATA_LABEL};
use serde::Serialize;

/// What the single map popup currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PopupContent {
    /// Lookup in flight.
    Loading,
    /// No overlay attached, or the click fell outside it.
    NoDataAvailable,
    /// The lookup succeeded but carried nothing usable.
    NoData,
    /// Per-model statistics table.
    Stats(StatResult),
    /// The lookup failed.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub at: LatLng,
    pub content: PopupContent,
}

impl Popup {
    pub fn new(at: LatLng, content: PopupContent) -> Self {
        Self { at, content }
    }

    pub fn loading(at: LatLng) -> Self {
        Self::new(at, PopupContent::Loading)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.content, PopupContent::Loading)
    }

    /// Format as HTML for the map popup.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"stats-popup\">\n");
        html.push_str(&format!(
            "  <h4>Location: {:.3}°, {:.3}°</h4>\n",
            self.at.lat, self.at.lng
        ));

        match &self.content {
            PopupContent::Loading => html.push_str("  <p>Loading...</p>\n"),
            PopupContent::NoDataAvailable => html.push_str("  <p>No data available</p>\n"),
            PopupContent::NoData => html.push_str(&format!("  <p>{}</p>\n", NO_DATA_LABEL)),
            PopupContent::Failed { message } => {
                html.push_str("  <p class=\"error\">Failed to load statistics</p>\n");
                html.push_str(&format!("  <p class=\"detail\">{}</p>\n", escape(message)));
            }
            PopupContent::Stats(result) => {
                html.push_str("  <table>\n");
                html.push_str("    <tr><th>Model</th>");
                let header = ModelStats::default();
                for (name, _) in header.fields() {
                    html.push_str(&format!("<th>{}</th>", name));
                }
                html.push_str("</tr>\n");
                for (model, stats) in &result.models {
                    html.push_str(&format!("    <tr><td>{}</td>", escape(model)));
                    for (_, field) in stats.fields() {
                        html.push_str(&format!("<td class=\"value\">{}</td>", escape(&field.to_string())));
                    }
                    html.push_str("</tr>\n");
                }
                html.push_str("  </table>\n");
            }
        }

        html.push_str("</div>");
        html
    }

    /// Format as plain text.
    pub fn to_text(&self) -> String {
        let mut text = format!("Location: {:.3}°N, {:.3}°E\n", self.at.lat, self.at.lng);

        match &self.content {
            PopupContent::Loading => text.push_str("Loading...\n"),
            PopupContent::NoDataAvailable => text.push_str("No data available\n"),
            PopupContent::NoData => text.push_str(&format!("{}\n", NO_DATA_LABEL)),
            PopupContent::Failed { message } => {
                text.push_str(&format!("Failed to load statistics: {}\n", message));
            }
            PopupContent::Stats(result) => {
                for (i, (model, stats)) in result.models.iter().enumerate() {
                    if i > 0 {
                        text.push_str("---\n");
                    }
                    text.push_str(&format!("Model: {}\n", model));
                    for (name, field) in stats.fields() {
                        text.push_str(&format!("{}: {}\n", name, field));
                    }
                }
            }
        }

        text
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
