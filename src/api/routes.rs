//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{asset, dashboard, health, metrics_text, status, AppState, DASHBOARD_PATH};

/// Create the host router for a loaded module.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public module surface
        .route(DASHBOARD_PATH, get(dashboard))
        .route(&format!("{DASHBOARD_PATH}/static/*path"), get(asset))
        // Host endpoints
        .route("/health", get(health))
        .route("/api/v1/status", get(status))
        .route("/metrics", get(metrics_text))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
