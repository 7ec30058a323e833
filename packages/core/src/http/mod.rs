//! HTTP Surface
//!
//! REST endpoints for the governance read-side services, built with axum's
//! modular routing pattern: each endpoint module exposes a `routes()`
//! function and the main router merges them.
//!
//! Session authentication and tenant resolution are upstream concerns; this
//! router assumes requests arrive already scoped and carries no guard
//! middleware of its own.

use crate::services::{HierarchyService, TraceabilityService};
use axum::{response::Json, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod governance_endpoints;
mod http_error;

pub use http_error::HttpError;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub hierarchy: Arc<HierarchyService>,
    pub traceability: Arc<TraceabilityService>,
}

/// Create the main application router with all endpoint modules
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(governance_endpoints::routes(state))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
