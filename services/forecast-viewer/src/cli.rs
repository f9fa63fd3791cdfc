//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use forecast_common::{OverlaySource, Period, Selection, SelectionError};

use crate::config::ViewerConfig;

/// Forecast map viewer
#[derive(Parser, Debug)]
#[command(name = "forecast-viewer")]
#[command(about = "Render forecast overlays, legends and point statistics without a browser")]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "FORECAST_VIEWER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Forecast service base URL (overrides the config file)
    #[arg(long, env = "FORECAST_SERVICE_URL")]
    pub service_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load an overlay and write overlay.png, legend.html and view.json
    Render(RenderArgs),
    /// Load an overlay, click a coordinate and print the popup
    Query(QueryArgs),
    /// Print the legend
    Legend(LegendArgs),
}

/// The forecast form.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    #[arg(long, default_value = "us")]
    pub region: String,

    #[arg(long, default_value = "NCEP-CFSv2")]
    pub model: String,

    /// Lead time in months (0.5 to 11.5)
    #[arg(long, default_value_t = 0.5)]
    pub lead_time: f64,

    /// monthly or seasonal
    #[arg(long, default_value = "monthly")]
    pub time_scale: String,

    /// Month ("01", "Jan") or season ("Jan-Mar")
    #[arg(long, default_value = "01")]
    pub period: String,

    #[arg(long, default_value = "model_avg")]
    pub statistic: String,

    /// Load this raster URL instead of the one derived from the selection
    #[arg(long)]
    pub url: Option<String>,
}

impl SelectionArgs {
    pub fn selection(&self) -> Result<Selection, SelectionError> {
        let period = Period::parse(&self.time_scale, &self.period)?;
        Selection::new(
            &self.region,
            &self.model,
            self.lead_time,
            period,
            &self.statistic,
        )
    }

    /// Where the overlay comes from: the explicit URL, or the configured template.
    pub fn overlay_source(&self, config: &ViewerConfig) -> Result<OverlaySource, SelectionError> {
        match &self.url {
            Some(url) => Ok(OverlaySource::new(url, &self.model)),
            None => Ok(self
                .selection()?
                .overlay_source(&config.service.base_url, &config.raster.path_template)),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Ask the service to generate plots first and load the produced GeoTIFF
    #[arg(long)]
    pub submit: bool,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Sample the overlay instead of calling /stats
    #[arg(long)]
    pub local: bool,

    /// Also write popup.html here
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LegendArgs {
    /// Print the HTML block instead of text
    #[arg(long)]
    pub html: bool,
}

impl Cli {
    /// Apply flag overrides to the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ViewerConfig) {
        if let Some(url) = &self.service_url {
            config.service.base_url = url.clone();
        }
        if let Command::Query(args) = &self.command {
            if args.local {
                config.query.mode = crate::config::QueryModeSetting::Local;
            }
        }
    }
}
