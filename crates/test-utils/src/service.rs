//! A mock forecast service for HTTP-level tests.
//!
//! Serves `POST /stats`, `POST /submit` and `GET /rasters/*path` on an
//! ephemeral localhost port. Replies are scripted per endpoint and every
//! request body is recorded for assertions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a JSON (or any text) body.
    Body(String),
    /// Arbitrary status with an empty body.
    Status(u16),
    /// Wait before answering with the inner reply.
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    pub fn json(body: &str) -> Self {
        MockReply::Body(body.to_string())
    }

    pub fn delayed(self, delay: Duration) -> Self {
        MockReply::Delayed(delay, Box::new(self))
    }
}

#[derive(Default)]
struct MockState {
    stats_reply: Mutex<Option<MockReply>>,
    submit_reply: Mutex<Option<MockReply>>,
    rasters: Mutex<HashMap<String, Vec<u8>>>,
    stats_bodies: Mutex<Vec<serde_json::Value>>,
    submit_bodies: Mutex<Vec<serde_json::Value>>,
    raster_hits: AtomicUsize,
}

/// Handle to a running mock service. The server stops when this is dropped.
pub struct MockForecastService {
    addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockForecastService {
    /// Bind to an ephemeral port and start serving on the current runtime.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/stats", post(stats_handler))
            .route("/submit", post(submit_handler))
            .route("/rasters/*path", get(raster_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock service");
        let addr = listener.local_addr().expect("mock service address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_stats_reply(&self, reply: MockReply) {
        *self.state.stats_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_submit_reply(&self, reply: MockReply) {
        *self.state.submit_reply.lock().unwrap() = Some(reply);
    }

    /// Serve `bytes` at `/rasters/{path}`.
    pub fn put_raster(&self, path: &str, bytes: Vec<u8>) {
        self.state
            .rasters
            .lock()
            .unwrap()
            .insert(path.trim_start_matches('/').to_string(), bytes);
    }

    /// JSON bodies received on `/stats`, in arrival order.
    pub fn stats_requests(&self) -> Vec<serde_json::Value> {
        self.state.stats_bodies.lock().unwrap().clone()
    }

    /// JSON bodies received on `/submit`, in arrival order.
    pub fn submit_requests(&self) -> Vec<serde_json::Value> {
        self.state.submit_bodies.lock().unwrap().clone()
    }

    pub fn raster_hits(&self) -> usize {
        self.state.raster_hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockForecastService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn stats_handler(State(state): State<Arc<MockState>>, body: Bytes) -> Response {
    record(&state.stats_bodies, &body);
    let reply = state.stats_reply.lock().unwrap().clone();
    respond(reply).await
}

async fn submit_handler(State(state): State<Arc<MockState>>, body: Bytes) -> Response {
    record(&state.submit_bodies, &body);
    let reply = state.submit_reply.lock().unwrap().clone();
    respond(reply).await
}

async fn raster_handler(State(state): State<Arc<MockState>>, Path(path): Path<String>) -> Response {
    state.raster_hits.fetch_add(1, Ordering::SeqCst);
    match state.rasters.lock().unwrap().get(&path) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn record(log: &Mutex<Vec<serde_json::Value>>, body: &[u8]) {
    let value = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);
    log.lock().unwrap().push(value);
}

async fn respond(reply: Option<MockReply>) -> Response {
    let mut reply = reply.unwrap_or(MockReply::Status(404));
    loop {
        match reply {
            MockReply::Body(body) => {
                return (
                    StatusCode::OK,
                    [("content-type", "application/json")],
                    body,
                )
                    .into_response()
            }
            MockReply::Status(code) => {
                return StatusCode::from_u16(code)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                    .into_response()
            }
            MockReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}
