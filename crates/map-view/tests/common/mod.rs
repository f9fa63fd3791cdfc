//! Scripted collaborators for map-view tests.
//!
//! Replies can be held back behind a [`Release`] handle so tests control the
//! order in which concurrent requests resolve.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use forecast_common::{LatLng, NetworkError, NetworkResult, OverlaySource, StatResult};
use map_view::{ActiveGrid, HeadlessSurface, MapSurface, RasterSource, StatsLookup};
use raster::RasterGrid;
use test_utils::fixtures::bounds::{CONUS, KANSAS};
use test_utils::{create_precip_grid, GeoTiffBuilder};
use tokio::sync::{oneshot, watch};

/// Lets a held reply through.
pub struct Release(oneshot::Sender<()>);

impl Release {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

fn hold() -> (Release, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (Release(tx), rx)
}

struct Script<T> {
    reply: NetworkResult<T>,
    hold: Option<oneshot::Receiver<()>>,
}

// ============================================================================
// Rasters
// ============================================================================

/// Serves raster bytes keyed by URL.
#[derive(Default)]
pub struct ScriptedRasters {
    scripts: RefCell<HashMap<String, Script<Bytes>>>,
    calls: Cell<usize>,
}

impl ScriptedRasters {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn ready(&self, url: &str, bytes: Vec<u8>) {
        self.script(url, Ok(Bytes::from(bytes)), None);
    }

    pub fn fail(&self, url: &str, err: NetworkError) {
        self.script(url, Err(err), None);
    }

    /// Answer with `bytes` only after the returned handle is released.
    pub fn held(&self, url: &str, bytes: Vec<u8>) -> Release {
        let (release, rx) = hold();
        self.script(url, Ok(Bytes::from(bytes)), Some(rx));
        release
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn script(&self, url: &str, reply: NetworkResult<Bytes>, hold: Option<oneshot::Receiver<()>>) {
        self.scripts
            .borrow_mut()
            .insert(url.to_string(), Script { reply, hold });
    }
}

#[async_trait(?Send)]
impl RasterSource for ScriptedRasters {
    async fn fetch(&self, source: &OverlaySource) -> NetworkResult<Bytes> {
        self.calls.set(self.calls.get() + 1);
        let (reply, hold) = {
            let mut scripts = self.scripts.borrow_mut();
            match scripts.get_mut(&source.url) {
                Some(script) => (script.reply.clone(), script.hold.take()),
                None => (Err(NetworkError::Status { status: 404 }), None),
            }
        };
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        reply
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Answers lookups from a queue, in call order.
#[derive(Default)]
pub struct ScriptedStats {
    queue: RefCell<VecDeque<Script<StatResult>>>,
    requests: RefCell<Vec<LatLng>>,
}

impl ScriptedStats {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push_json(&self, body: &str) {
        let reply = StatResult::from_json(body).map_err(NetworkError::from);
        self.queue.borrow_mut().push_back(Script { reply, hold: None });
    }

    pub fn push_error(&self, err: NetworkError) {
        self.queue.borrow_mut().push_back(Script {
            reply: Err(err),
            hold: None,
        });
    }

    pub fn push_held_json(&self, body: &str) -> Release {
        let (release, rx) = hold();
        let reply = StatResult::from_json(body).map_err(NetworkError::from);
        self.queue.borrow_mut().push_back(Script {
            reply,
            hold: Some(rx),
        });
        release
    }

    /// Coordinates of every lookup, in call order.
    pub fn requests(&self) -> Vec<LatLng> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl StatsLookup for ScriptedStats {
    async fn lookup(&self, at: LatLng) -> NetworkResult<StatResult> {
        self.requests.borrow_mut().push(at);
        let script = self.queue.borrow_mut().pop_front();
        let Some(script) = script else {
            return Err(NetworkError::transport("no scripted reply"));
        };
        if let Some(rx) = script.hold {
            let _ = rx.await;
        }
        script.reply
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const CONUS_URL: &str = "http://forecast.test/rasters/conus.tif";
pub const KANSAS_URL: &str = "http://forecast.test/rasters/kansas.tif";
pub const MODEL: &str = "NCEP-CFSv2";

pub fn conus_tiff() -> Vec<u8> {
    GeoTiffBuilder::new(59, 24)
        .bounds(CONUS)
        .values(create_precip_grid(59, 24, 130.0))
        .build()
}

pub fn kansas_tiff() -> Vec<u8> {
    GeoTiffBuilder::new(15, 6)
        .bounds(KANSAS)
        .values(create_precip_grid(15, 6, 60.0))
        .build()
}

pub fn conus_source() -> OverlaySource {
    OverlaySource::new(CONUS_URL, MODEL)
}

pub fn kansas_source() -> OverlaySource {
    OverlaySource::new(KANSAS_URL, MODEL)
}

pub fn conus_grid() -> RasterGrid {
    raster::decode(&conus_tiff()).unwrap()
}

/// A watch channel already holding the CONUS grid, as an attached overlay would publish it.
pub fn attached_conus() -> (watch::Sender<Option<ActiveGrid>>, watch::Receiver<Option<ActiveGrid>>) {
    watch::channel(Some(ActiveGrid {
        grid: Arc::new(conus_grid()),
        model: MODEL.to_string(),
    }))
}

pub fn headless() -> (Rc<HeadlessSurface>, Rc<dyn MapSurface>) {
    let surface = Rc::new(HeadlessSurface::new());
    let dyn_surface: Rc<dyn MapSurface> = surface.clone();
    (surface, dyn_surface)
}
