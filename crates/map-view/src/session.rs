//! One map surface's lifetime: legend, overlay and point queries.
//!
//! A session is created when the surface is, and disposed on teardown. All
//! work runs on the caller's task; [`MapSession::run`] interleaves incoming
//! events with in-flight loads so clicks are served while an overlay loads.

use std::cell::Cell;
use std::rc::Rc;

use forecast_common::{LatLng, OverlaySource};
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use renderer::Legend;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::overlay::{OverlayConfig, OverlayManager, OverlayOutcome};
use crate::popup::Popup;
use crate::query::{LookupMode, PointQueryController, QueryOutcome};
use crate::sources::{RasterSource, StatsLookup};
use crate::surface::MapSurface;

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub overlay: OverlayConfig,
    pub lookup: LookupMode,
}

/// Input to [`MapSession::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The user picked a new forecast configuration.
    Select(OverlaySource),
    /// The user clicked the map.
    Click(LatLng),
    /// The surface is going away.
    Teardown,
}

/// What an event ended up doing, in completion order.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Overlay(OverlayOutcome),
    Query(QueryOutcome),
}

pub struct MapSession {
    surface: Rc<dyn MapSurface>,
    overlay: OverlayManager,
    query: PointQueryController,
    legend: Legend,
    disposed: Cell<bool>,
}

impl MapSession {
    /// Wire up the components and put the legend on the surface.
    pub fn new(
        surface: Rc<dyn MapSurface>,
        rasters: Rc<dyn RasterSource>,
        stats: Rc<dyn StatsLookup>,
        config: SessionConfig,
    ) -> Self {
        let legend = Legend::from_ramp(&config.overlay.ramp);
        let overlay = OverlayManager::new(surface.clone(), rasters, config.overlay);
        let query = PointQueryController::new(surface.clone(), stats, overlay.subscribe(), config.lookup);

        surface.add_legend(&legend);
        info!(lookup = ?config.lookup, "Map session created");

        Self {
            surface,
            overlay,
            query,
            legend,
            disposed: Cell::new(false),
        }
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    pub fn query(&self) -> &PointQueryController {
        &self.query
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn popup(&self) -> Option<Popup> {
        self.query.popup()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Replace the overlay. A newly attached overlay clears the popup and
    /// supersedes any lookup against the old one.
    pub async fn select(&self, source: OverlaySource) -> OverlayOutcome {
        if self.disposed.get() {
            return OverlayOutcome::Superseded;
        }
        let outcome = self.overlay.request(source).await;
        if matches!(outcome, OverlayOutcome::Attached { .. }) {
            self.query.reset();
        }
        outcome
    }

    pub async fn click(&self, at: LatLng) -> QueryOutcome {
        self.query.click(at).await
    }

    /// Dispose the session. Idempotent.
    pub fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.query.dispose();
        self.overlay.teardown();
        self.surface.remove_legend();
        info!("Map session disposed");
    }

    /// Process events until teardown (or the sender is dropped), then wait
    /// for in-flight work to settle.
    pub async fn run(&self, mut events: mpsc::Receiver<MapEvent>) -> Vec<EventOutcome> {
        let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, EventOutcome>> = FuturesUnordered::new();
        let mut outcomes = Vec::new();
        let mut open = true;

        loop {
            tokio::select! {
                event = events.recv(), if open => match event {
                    Some(MapEvent::Select(source)) => {
                        debug!(url = %source.url, "Select event");
                        in_flight.push(self.select(source).map(EventOutcome::Overlay).boxed_local());
                    }
                    Some(MapEvent::Click(at)) => {
                        debug!(lat = at.lat, lng = at.lng, "Click event");
                        in_flight.push(self.click(at).map(EventOutcome::Query).boxed_local());
                    }
                    Some(MapEvent::Teardown) | None => {
                        self.teardown();
                        open = false;
                    }
                },
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                    outcomes.push(outcome);
                }
                else => break,
            }
        }

        outcomes
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
