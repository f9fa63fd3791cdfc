//! Click-to-statistics lookups.
//!
//! Each click opens (or moves) the single popup in a loading state and starts
//! a lookup tagged with a fresh request id. Only the latest id may write the
//! popup; earlier lookups that resolve later are dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use forecast_common::{LatLng, ModelStats, NetworkError, Sample, StatField, StatResult};
use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::overlay::ActiveGrid;
use crate::popup::{Popup, PopupContent};
use crate::sources::StatsLookup;
use crate::surface::MapSurface;
use crate::versioned::VersionGate;

/// Where point statistics come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// `POST /stats` on the forecast service.
    #[default]
    Remote,
    /// Sample the attached grid directly.
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Pending,
    Resolved,
    Errored,
}

/// The most recent click and where its lookup stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingQuery {
    pub coordinate: LatLng,
    pub request_id: u64,
    pub status: QueryStatus,
}

/// Result of one click.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Statistics table shown.
    Rendered,
    /// No overlay under the click; no lookup was made.
    NoDataAvailable,
    /// The lookup succeeded without usable values.
    Empty,
    /// The lookup failed; an error popup is shown.
    Failed(NetworkError),
    /// A newer click (or a reset) arrived first; the popup was not touched.
    Superseded,
    /// The controller was disposed.
    Ignored,
}

impl QueryOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            QueryOutcome::Rendered => "rendered",
            QueryOutcome::NoDataAvailable => "no_data_available",
            QueryOutcome::Empty => "empty",
            QueryOutcome::Failed(_) => "failed",
            QueryOutcome::Superseded => "superseded",
            QueryOutcome::Ignored => "ignored",
        }
    }
}

pub struct PointQueryController {
    surface: Rc<dyn MapSurface>,
    stats: Rc<dyn StatsLookup>,
    mode: LookupMode,
    grid: watch::Receiver<Option<ActiveGrid>>,
    gate: VersionGate,
    pending: RefCell<Option<PendingQuery>>,
    popup: RefCell<Option<Popup>>,
    disposed: Cell<bool>,
}

impl PointQueryController {
    /// Create the controller and bind the surface's click handler.
    pub fn new(
        surface: Rc<dyn MapSurface>,
        stats: Rc<dyn StatsLookup>,
        grid: watch::Receiver<Option<ActiveGrid>>,
        mode: LookupMode,
    ) -> Self {
        surface.bind_click_handler();
        Self {
            surface,
            stats,
            mode,
            grid,
            gate: VersionGate::new(),
            pending: RefCell::new(None),
            popup: RefCell::new(None),
            disposed: Cell::new(false),
        }
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn pending(&self) -> Option<PendingQuery> {
        *self.pending.borrow()
    }

    pub fn popup(&self) -> Option<Popup> {
        self.popup.borrow().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Handle a click at `at`.
    #[instrument(skip(self, at), fields(lat = at.lat, lng = at.lng))]
    pub async fn click(&self, at: LatLng) -> QueryOutcome {
        let outcome = self.resolve(at).await;
        counter!("point_queries_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn resolve(&self, at: LatLng) -> QueryOutcome {
        if self.disposed.get() {
            return QueryOutcome::Ignored;
        }

        let ticket = self.gate.issue();
        *self.pending.borrow_mut() = Some(PendingQuery {
            coordinate: at,
            request_id: ticket.id(),
            status: QueryStatus::Pending,
        });

        let active = self.grid.borrow().clone();
        let active = match active {
            Some(active) if active.bounds().contains(at) => active,
            _ => {
                debug!(request_id = ticket.id(), "No overlay under click");
                self.show(Popup::new(at, PopupContent::NoDataAvailable));
                self.set_status(QueryStatus::Resolved);
                return QueryOutcome::NoDataAvailable;
            }
        };

        self.show(Popup::loading(at));

        let result = match self.mode {
            LookupMode::Remote => self.stats.lookup(at).await,
            LookupMode::Local => Ok(sample_locally(&active, at)),
        };

        if !self.gate.is_current(ticket) {
            debug!(request_id = ticket.id(), "Discarding superseded lookup");
            return QueryOutcome::Superseded;
        }

        match result {
            Ok(stats) if stats.has_usable_data() => {
                self.show(Popup::new(at, PopupContent::Stats(stats)));
                self.set_status(QueryStatus::Resolved);
                QueryOutcome::Rendered
            }
            Ok(_) => {
                self.show(Popup::new(at, PopupContent::NoData));
                self.set_status(QueryStatus::Resolved);
                QueryOutcome::Empty
            }
            Err(err) => {
                warn!(request_id = ticket.id(), error = %err, kind = err.kind(), "Point query failed");
                self.show(Popup::new(
                    at,
                    PopupContent::Failed {
                        message: err.to_string(),
                    },
                ));
                self.set_status(QueryStatus::Errored);
                QueryOutcome::Failed(err)
            }
        }
    }

    /// Close the popup and supersede the outstanding lookup.
    pub fn reset(&self) {
        self.gate.invalidate();
        self.pending.borrow_mut().take();
        if self.popup.borrow_mut().take().is_some() {
            self.surface.close_popup();
        }
    }

    /// Reset and stop listening for clicks. Later clicks are ignored.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.reset();
        self.surface.unbind_click_handler();
        info!("Point query controller disposed");
    }

    fn show(&self, popup: Popup) {
        self.surface.show_popup(&popup);
        *self.popup.borrow_mut() = Some(popup);
    }

    fn set_status(&self, status: QueryStatus) {
        if let Some(pending) = self.pending.borrow_mut().as_mut() {
            pending.status = status;
        }
    }
}

/// One row for the overlay's model holding the sampled cell value.
fn sample_locally(active: &ActiveGrid, at: LatLng) -> StatResult {
    let forecast_value = match active.grid.sample(at) {
        Some(Sample::Value(v)) => StatField::from_number(v),
        _ => StatField::NoData,
    };
    StatResult::single(
        active.model.clone(),
        ModelStats {
            forecast_value,
            ..ModelStats::default()
        },
    )
}
