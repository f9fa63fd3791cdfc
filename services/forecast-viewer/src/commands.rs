//! Subcommand implementations.
//!
//! Each command builds a [`MapSession`] over a [`HeadlessSurface`] and reads
//! the result back off the surface, so the files written are exactly what the
//! map would display.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use forecast_client::ForecastClient;
use forecast_common::{GeoBounds, LatLng, OverlaySource};
use map_view::{
    HeadlessSurface, MapSession, MapSurface, OverlayOutcome, Popup, QueryOutcome, RasterSource,
    StatsLookup,
};
use renderer::Legend;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Cli, Command, LegendArgs, QueryArgs, RenderArgs};
use crate::config::ViewerConfig;

/// Summary written to `view.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSummary {
    pub url: String,
    pub model: String,
    pub bounds: GeoBounds,
    pub width: usize,
    pub height: usize,
    pub opacity: f32,
    pub value_range: Option<(f32, f32)>,
    pub valid_cells: usize,
}

#[derive(Debug)]
pub struct RenderReport {
    pub summary: ViewSummary,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct QueryReport {
    pub overlay: OverlayOutcome,
    pub outcome: QueryOutcome,
    pub popup: Option<Popup>,
    pub files: Vec<PathBuf>,
}

/// Dispatch the parsed command.
pub async fn run(cli: &Cli, config: &ViewerConfig) -> Result<()> {
    match &cli.command {
        Command::Render(args) => {
            let report = render(args, config).await?;
            for file in &report.files {
                println!("{}", file.display());
            }
        }
        Command::Query(args) => {
            let report = query(args, config).await?;
            if let Some(popup) = &report.popup {
                print!("{}", popup.to_text());
            }
            if let QueryOutcome::Failed(err) = &report.outcome {
                bail!("point query failed: {}", err);
            }
        }
        Command::Legend(args) => println!("{}", legend(args, config)),
    }
    Ok(())
}

struct Viewer {
    surface: Rc<HeadlessSurface>,
    session: MapSession,
}

fn open_session(config: &ViewerConfig) -> Result<(ForecastClient, Viewer)> {
    let client = ForecastClient::new(&config.client_config())?;
    let surface = Rc::new(HeadlessSurface::new());
    let dyn_surface: Rc<dyn MapSurface> = surface.clone();
    let rasters: Rc<dyn RasterSource> = Rc::new(client.rasters());
    let stats: Rc<dyn StatsLookup> = Rc::new(client.stats());
    let session = MapSession::new(dyn_surface, rasters, stats, config.session_config());
    Ok((client, Viewer { surface, session }))
}

/// Load the selected overlay and write `overlay.png`, `legend.html` and `view.json`.
pub async fn render(args: &RenderArgs, config: &ViewerConfig) -> Result<RenderReport> {
    let (client, viewer) = open_session(config)?;
    let mut source = args
        .selection
        .overlay_source(config)
        .context("Invalid forecast selection")?;

    if args.submit {
        source = submit_first(&client, args, source).await?;
    }

    info!(url = %source.url, "Rendering overlay");
    let outcome = viewer.session.select(source.clone()).await;
    if let OverlayOutcome::Failed(err) = &outcome {
        bail!("overlay failed to load: {}", err);
    }

    let layer = viewer
        .surface
        .top_layer()
        .ok_or_else(|| anyhow!("no overlay attached ({})", outcome.label()))?;
    let grid = viewer
        .session
        .overlay()
        .active_grid()
        .ok_or_else(|| anyhow!("no active grid"))?;

    let summary = ViewSummary {
        url: source.url,
        model: source.model,
        bounds: layer.bounds(),
        width: layer.width(),
        height: layer.height(),
        opacity: layer.opacity(),
        value_range: grid.grid.value_range(),
        valid_cells: grid.grid.valid_count(),
    };

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {:?}", args.out))?;

    let png = layer.to_png().context("Failed to encode overlay PNG")?;
    let files = vec![
        write(&args.out, "overlay.png", &png)?,
        write(&args.out, "legend.html", viewer.session.legend().to_html().as_bytes())?,
        write(
            &args.out,
            "view.json",
            serde_json::to_string_pretty(&summary)?.as_bytes(),
        )?,
    ];

    info!(
        width = summary.width,
        height = summary.height,
        out = %args.out.display(),
        "Overlay rendered"
    );
    Ok(RenderReport { summary, files })
}

async fn submit_first(
    client: &ForecastClient,
    args: &RenderArgs,
    fallback: OverlaySource,
) -> Result<OverlaySource> {
    let selection = args
        .selection
        .selection()
        .context("Invalid forecast selection")?;
    let plots = client.plots();
    let reply = plots.submit(&selection.submit_request()).await?;

    if !reply.success {
        bail!(
            "plot generation failed: {}",
            reply.error.as_deref().unwrap_or("unknown error")
        );
    }

    match reply.raster_plot() {
        Some(path) => Ok(OverlaySource::new(plots.plot_url(path), &selection.model)),
        None => {
            warn!(plots = reply.plots.len(), "No GeoTIFF among generated plots");
            Ok(fallback)
        }
    }
}

/// Load the selected overlay, click `(lat, lng)` and return the popup.
pub async fn query(args: &QueryArgs, config: &ViewerConfig) -> Result<QueryReport> {
    let (_client, viewer) = open_session(config)?;
    let source = args
        .selection
        .overlay_source(config)
        .context("Invalid forecast selection")?;

    let overlay = viewer.session.select(source).await;
    if let OverlayOutcome::Failed(err) = &overlay {
        warn!(error = %err, "Overlay failed to load; the click will find no data");
    }

    let at = LatLng::new(args.lat, args.lng);
    let outcome = viewer.session.click(at).await;
    let popup = viewer.surface.popup();

    let mut files = Vec::new();
    if let (Some(out), Some(popup)) = (&args.out, &popup) {
        fs::create_dir_all(out)
            .with_context(|| format!("Failed to create output directory {:?}", out))?;
        files.push(write(out, "popup.html", popup.to_html().as_bytes())?);
    }

    Ok(QueryReport {
        overlay,
        outcome,
        popup,
        files,
    })
}

pub fn legend(args: &LegendArgs, config: &ViewerConfig) -> String {
    let legend = Legend::from_ramp(&config.session_config().overlay.ramp);
    if args.html {
        legend.to_html()
    } else {
        legend.to_string()
    }
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}
