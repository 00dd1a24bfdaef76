//! AI Solutions Hub HTTP server
//!
//! Exposes the fallback router over HTTP:
//! - `POST /api/ai` routes a prompt through the provider chain
//! - `GET /health` reports liveness and the configured chain
//! - `GET /` describes the service

pub mod error;
mod routes;

use aihub_core::providers::RoutingStrategy;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<dyn RoutingStrategy>,
    /// Cancelled on shutdown so in-flight routing stops early
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(router: Arc<dyn RoutingStrategy>) -> Self {
        Self {
            router,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}

/// Build the HTTP application
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/ai", post(routes::generate))
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
