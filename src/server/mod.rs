//! HTTP boundary: router, handlers, wire types, and error mapping.
//!
//! The surface mirrors what upstream ingestion pipelines expect:
//!
//! - `GET /health` — liveness probe, independent of pool load.
//! - `GET /stats` — pool counter snapshot.
//! - `POST /` — parse one wikitext document.

pub mod error;
pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::JobPool;

/// Documents can be very large; the body ceiling is deliberately high
/// rather than unbounded.
const MAX_BODY_BYTES: usize = 1024 * 1024 * 1024;

/// Shared application state: the one job pool, constructed at startup and
/// owned for the process lifetime.
pub struct AppState {
    /// The pool every parse request is dispatched through.
    pub pool: JobPool,
}

/// Build the service router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::parse_document))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
