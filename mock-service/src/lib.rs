//! A stand-in for the Firestore REST API used by integration tests.
//!
//! Routes:
//! - `/documents/:collection` answers 200 with an empty document list.
//! - `/status/:code` answers with the given status.
//! - `/delay/ms/:delay_ms` answers 200 after the given delay.
use axum::{
    debug_handler,
    extract::Path,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub fn app() -> Router {
    Router::new()
        .route("/documents/:collection", get(collection))
        .route("/status/:code", get(status))
        .route("/delay/ms/:delay_ms", get(delay))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app()).await
}

/// Bind an ephemeral local port and serve in the background.
pub async fn spawn() -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app()).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });
    Ok(addr)
}

#[derive(Debug, Serialize)]
pub struct Documents {
    pub documents: Vec<serde_json::Value>,
}

#[debug_handler]
pub async fn collection(Path(collection): Path<String>) -> Json<Documents> {
    HITS.fetch_add(1, Ordering::Relaxed);
    debug!("GET collection {collection}");
    Json(Documents { documents: vec![] })
}

#[debug_handler]
pub async fn status(Path(code): Path<u16>) -> StatusCode {
    HITS.fetch_add(1, Ordering::Relaxed);
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

#[debug_handler]
pub async fn delay(Path(delay_ms): Path<u64>) {
    HITS.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

static HITS: AtomicU64 = AtomicU64::new(0);

/// Requests served by every instance in this process.
pub fn hits() -> u64 {
    HITS.load(Ordering::Relaxed)
}
