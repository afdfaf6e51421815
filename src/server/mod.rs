//! HTTP transport: plain price-alert query API plus the JSON-RPC endpoint.

mod handlers;
mod sse;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{info, warn};

use crate::api::prices::PriceSource;
use crate::error::PriceAlertError;
use crate::mcp::McpHandler;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<PriceSource>,
    pub mcp: McpHandler,
    pub heartbeat_interval: Duration,
}

impl AppState {
    pub fn new(source: Arc<PriceSource>) -> Self {
        Self {
            mcp: McpHandler::new(source.clone()),
            source,
            heartbeat_interval: sse::HEARTBEAT_INTERVAL,
        }
    }

    #[cfg(test)]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/price-alert", get(handlers::price_alert))
        .route("/mcp", get(handlers::mcp_stream).post(handlers::mcp_rpc))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> Result<(), PriceAlertError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting Crypto Price Alert Server on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;
    info!(
        "{} {} -> {} ({:?})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
