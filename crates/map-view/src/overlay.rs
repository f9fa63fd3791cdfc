//! Overlay lifecycle.
//!
//! ```text
//! Empty ──request──▶ Loading ──decoded──▶ Attached
//!   ▲                  │  ▲                  │
//!   └──teardown/fail───┘  └─────request──────┘
//! ```
//!
//! The attached layer stays on the map while a replacement loads. Only the
//! newest request may attach; anything older is discarded when it resumes.
//! The previous layer is detached before the new one is attached, in the same
//! synchronous step, so the surface never holds more than one overlay.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use forecast_common::{GeoBounds, OverlaySource};
use metrics::{counter, histogram};
use raster::RasterGrid;
use renderer::{paint, ColorRamp, OverlayLayer};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::OverlayError;
use crate::sources::RasterSource;
use crate::surface::{LayerId, MapSurface};
use crate::versioned::VersionGate;

/// Overlay behavior settings.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Layer opacity handed to the surface.
    pub opacity: f32,
    /// Keep the previous overlay when a replacement fails to load.
    pub retain_on_failure: bool,
    pub ramp: ColorRamp,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opacity: 0.1,
            retain_on_failure: true,
            ramp: ColorRamp::precipitation(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Empty,
    Loading,
    Attached,
}

/// Reference to the one attached overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandle {
    pub layer: LayerId,
    pub bounds: GeoBounds,
    pub model: String,
}

/// The grid behind the attached overlay, as seen by point queries.
#[derive(Debug, Clone)]
pub struct ActiveGrid {
    pub grid: Arc<RasterGrid>,
    pub model: String,
}

impl ActiveGrid {
    pub fn bounds(&self) -> GeoBounds {
        self.grid.bounds()
    }
}

/// Result of one overlay request.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayOutcome {
    Attached { bounds: GeoBounds },
    Failed(OverlayError),
    /// A newer request (or teardown) arrived first; nothing was changed.
    Superseded,
}

impl OverlayOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            OverlayOutcome::Attached { .. } => "attached",
            OverlayOutcome::Failed(_) => "failed",
            OverlayOutcome::Superseded => "superseded",
        }
    }
}

/// Owns the overlay slot on the map surface.
pub struct OverlayManager {
    surface: Rc<dyn MapSurface>,
    source: Rc<dyn RasterSource>,
    config: OverlayConfig,
    gate: VersionGate,
    phase: Cell<OverlayPhase>,
    attached: RefCell<Option<OverlayHandle>>,
    active: watch::Sender<Option<ActiveGrid>>,
}

impl OverlayManager {
    pub fn new(surface: Rc<dyn MapSurface>, source: Rc<dyn RasterSource>, config: OverlayConfig) -> Self {
        let (active, _) = watch::channel(None);
        Self {
            surface,
            source,
            config,
            gate: VersionGate::new(),
            phase: Cell::new(OverlayPhase::Empty),
            attached: RefCell::new(None),
            active,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase.get()
    }

    pub fn handle(&self) -> Option<OverlayHandle> {
        self.attached.borrow().clone()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Read-only view of the attached grid.
    pub fn subscribe(&self) -> watch::Receiver<Option<ActiveGrid>> {
        self.active.subscribe()
    }

    pub fn active_grid(&self) -> Option<ActiveGrid> {
        self.active.borrow().clone()
    }

    /// Load `source` and make it the attached overlay.
    ///
    /// The current overlay (if any) stays visible until the new one is ready.
    #[instrument(skip(self, source), fields(url = %source.url, model = %source.model))]
    pub async fn request(&self, source: OverlaySource) -> OverlayOutcome {
        let ticket = self.gate.issue();
        self.phase.set(OverlayPhase::Loading);
        debug!(request_id = ticket.id(), "Loading overlay");

        let loaded = self.load(&source).await;

        let outcome = if !self.gate.is_current(ticket) {
            debug!(request_id = ticket.id(), "Discarding superseded overlay result");
            OverlayOutcome::Superseded
        } else {
            match loaded {
                Ok((grid, layer)) => {
                    let bounds = grid.bounds();
                    self.replace(grid, layer, source.model);
                    OverlayOutcome::Attached { bounds }
                }
                Err(err) => {
                    warn!(error = %err, kind = err.kind(), "Overlay load failed");
                    self.settle_after_failure();
                    OverlayOutcome::Failed(err)
                }
            }
        };

        counter!("overlay_requests_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    /// Detach the overlay and supersede any in-flight request.
    pub fn teardown(&self) {
        self.gate.invalidate();
        self.detach_current();
        self.phase.set(OverlayPhase::Empty);
        info!("Overlay torn down");
    }

    async fn load(&self, source: &OverlaySource) -> Result<(RasterGrid, OverlayLayer), OverlayError> {
        let bytes = self.source.fetch(source).await?;
        let ramp = self.config.ramp.clone();
        let opacity = self.config.opacity;

        tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let grid = raster::decode(&bytes)?;
            histogram!("raster_decode_seconds").record(start.elapsed().as_secs_f64());
            let layer = paint(&grid, &ramp, opacity);
            Ok::<_, OverlayError>((grid, layer))
        })
        .await
        .map_err(|e| OverlayError::Worker(e.to_string()))?
    }

    fn replace(&self, grid: RasterGrid, layer: OverlayLayer, model: String) {
        let bounds = grid.bounds();
        self.detach_current();

        let id = self.surface.attach_layer(layer);
        self.surface.fit_bounds(bounds);

        *self.attached.borrow_mut() = Some(OverlayHandle {
            layer: id,
            bounds,
            model: model.clone(),
        });
        self.active.send_replace(Some(ActiveGrid {
            grid: Arc::new(grid),
            model,
        }));
        self.phase.set(OverlayPhase::Attached);
        info!(layer = %id, bounds = %bounds, "Overlay attached");
    }

    fn settle_after_failure(&self) {
        let has_overlay = self.attached.borrow().is_some();
        if has_overlay && self.config.retain_on_failure {
            self.phase.set(OverlayPhase::Attached);
        } else {
            self.detach_current();
            self.phase.set(OverlayPhase::Empty);
        }
    }

    fn detach_current(&self) {
        let previous = self.attached.borrow_mut().take();
        if let Some(handle) = previous {
            self.surface.detach_layer(handle.layer);
            debug!(layer = %handle.layer, "Detached overlay");
        }
        self.active.send_replace(None);
    }
}
