//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET /`        - Service banner
//! - `GET /health`  - Health check: store, cache, click queue, sessions
//! - `GET /{code}`  - Short link redirect (rate limited per IP)
//!
//! Trailing slashes are trimmed before routing, so `/abc123/` redirects like
//! `/abc123`.

use crate::api::handlers::{health_handler, index_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let redirects = Router::new()
        .route("/{code}", get(redirect_handler))
        .layer(rate_limit::layer());

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .merge(redirects)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
