//! Test site lifecycle management
//!
//! Each test gets an isolated HTTP server with its own mutable set of files.
//! Every shard request is recorded so tests can assert on network access.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const SERVER_READY_TIMEOUT_MS: u64 = 5000;
const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

#[derive(Default)]
struct SiteState {
    /// Keyed by path below `/data/`, e.g. `singers/h.json`.
    files: Mutex<HashMap<String, String>>,
    shard_hits: Mutex<Vec<String>>,
}

async fn serve_manifest(State(state): State<Arc<SiteState>>) -> Response {
    match state.files.lock().unwrap().get("manifest.json") {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_shard(
    State(state): State<Arc<SiteState>>,
    Path((dir, file)): Path<(String, String)>,
) -> Response {
    let key = format!("{}/{}", dir, file);
    state.shard_hits.lock().unwrap().push(key.clone());
    match state.files.lock().unwrap().get(&key) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Test site instance serving `/data/...`
///
/// When dropped, the server gracefully shuts down.
pub struct TestSite {
    /// Base URL for the fetcher (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: Arc<SiteState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestSite {
    /// Spawns a new test site on a random port and waits until it answers.
    pub async fn spawn() -> Self {
        let state = Arc::new(SiteState::default());

        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/data/manifest.json", get(serve_manifest))
            .route("/data/{dir}/{file}", get(serve_shard))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let site = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        };
        site.wait_for_ready().await;
        site
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Site did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    pub fn put_shard(&self, dir: &str, file: &str, body: &str) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(format!("{}/{}", dir, file), body.to_string());
    }

    pub fn set_manifest(&self, body: &str) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert("manifest.json".to_string(), body.to_string());
    }

    /// Shard paths requested so far, in request order.
    pub fn shard_hits(&self) -> Vec<String> {
        self.state.shard_hits.lock().unwrap().clone()
    }
}

impl Drop for TestSite {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
