//! The map surface the core draws on.
//!
//! The surface is owned by the UI task, so methods take `&self` and
//! implementations use interior mutability. The overlay manager and the query
//! controller share one surface through an `Rc`.

use std::cell::RefCell;
use std::fmt;

use forecast_common::GeoBounds;
use renderer::{Legend, OverlayLayer};

use crate::popup::Popup;

/// Identifier of an attached layer, unique per surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Operations the core needs from an interactive map widget.
pub trait MapSurface {
    /// Add a painted layer and return its id.
    fn attach_layer(&self, layer: OverlayLayer) -> LayerId;

    /// Remove a layer. Unknown ids are ignored.
    fn detach_layer(&self, id: LayerId);

    /// Move the viewport so `bounds` is visible.
    fn fit_bounds(&self, bounds: GeoBounds);

    /// Open the popup, or replace the open one.
    fn show_popup(&self, popup: &Popup);

    fn close_popup(&self);

    fn add_legend(&self, legend: &Legend);

    fn remove_legend(&self);

    /// Start delivering clicks to the query controller.
    fn bind_click_handler(&self);

    fn unbind_click_handler(&self);
}

/// Everything that happened to a [`HeadlessSurface`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    LayerAttached(LayerId),
    LayerDetached(LayerId),
    BoundsFitted(GeoBounds),
    PopupShown(Popup),
    PopupClosed,
    LegendAdded,
    LegendRemoved,
    ClickHandlerBound,
    ClickHandlerUnbound,
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_id: u64,
    layers: Vec<(LayerId, OverlayLayer)>,
    max_layers: usize,
    viewport: Option<GeoBounds>,
    popup: Option<Popup>,
    legend: Option<Legend>,
    click_bound: bool,
    events: Vec<SurfaceEvent>,
}

/// A map surface without a display.
///
/// Keeps the current layers, viewport, popup and legend, plus a log of every
/// call, so callers can render the final state to files and tests can check
/// ordering.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    state: RefCell<SurfaceState>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.state.borrow().layers.iter().map(|(id, _)| *id).collect()
    }

    pub fn layer_count(&self) -> usize {
        self.state.borrow().layers.len()
    }

    /// Highest number of layers attached at the same time.
    pub fn max_layers_seen(&self) -> usize {
        self.state.borrow().max_layers
    }

    /// The most recently attached layer still on the map.
    pub fn top_layer(&self) -> Option<OverlayLayer> {
        self.state.borrow().layers.last().map(|(_, layer)| layer.clone())
    }

    pub fn viewport(&self) -> Option<GeoBounds> {
        self.state.borrow().viewport
    }

    pub fn popup(&self) -> Option<Popup> {
        self.state.borrow().popup.clone()
    }

    pub fn legend(&self) -> Option<Legend> {
        self.state.borrow().legend.clone()
    }

    pub fn click_handler_bound(&self) -> bool {
        self.state.borrow().click_bound
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.state.borrow().events.clone()
    }

    /// Number of popups opened so far.
    pub fn popups_shown(&self) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::PopupShown(_)))
            .count()
    }
}

impl MapSurface for HeadlessSurface {
    fn attach_layer(&self, layer: OverlayLayer) -> LayerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = LayerId(state.next_id);
        state.layers.push((id, layer));
        state.max_layers = state.max_layers.max(state.layers.len());
        state.events.push(SurfaceEvent::LayerAttached(id));
        id
    }

    fn detach_layer(&self, id: LayerId) {
        let mut state = self.state.borrow_mut();
        let before = state.layers.len();
        state.layers.retain(|(layer_id, _)| *layer_id != id);
        if state.layers.len() != before {
            state.events.push(SurfaceEvent::LayerDetached(id));
        }
    }

    fn fit_bounds(&self, bounds: GeoBounds) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some(bounds);
        state.events.push(SurfaceEvent::BoundsFitted(bounds));
    }

    fn show_popup(&self, popup: &Popup) {
        let mut state = self.state.borrow_mut();
        state.popup = Some(popup.clone());
        state.events.push(SurfaceEvent::PopupShown(popup.clone()));
    }

    fn close_popup(&self) {
        let mut state = self.state.borrow_mut();
        if state.popup.take().is_some() {
            state.events.push(SurfaceEvent::PopupClosed);
        }
    }

    fn add_legend(&self, legend: &Legend) {
        let mut state = self.state.borrow_mut();
        state.legend = Some(legend.clone());
        state.events.push(SurfaceEvent::LegendAdded);
    }

    fn remove_legend(&self) {
        let mut state = self.state.borrow_mut();
        if state.legend.take().is_some() {
            state.events.push(SurfaceEvent::LegendRemoved);
        }
    }

    fn bind_click_handler(&self) {
        let mut state = self.state.borrow_mut();
        state.click_bound = true;
        state.events.push(SurfaceEvent::ClickHandlerBound);
    }

    fn unbind_click_handler(&self) {
        let mut state = self.state.borrow_mut();
        if state.click_bound {
            state.click_bound = false;
            state.events.push(SurfaceEvent::ClickHandlerUnbound);
        }
    }
}
