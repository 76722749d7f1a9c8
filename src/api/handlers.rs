//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error};

use crate::metrics;
use crate::registry::ModuleRegistry;
use crate::render::TemplateStore;

/// Fixed public route of the dashboard module.
pub const DASHBOARD_PATH: &str = "/magento_cegid_dashboard";

/// Qualified name of the template the dashboard route renders.
pub const INDEX_TEMPLATE: &str = "magento_cegid_dashboard.index";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry populated at startup.
    pub registry: Arc<ModuleRegistry>,
    /// Named view templates.
    pub templates: Arc<TemplateStore>,
    /// Prometheus exposition handle, when the exporter is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state from a loaded registry and its templates.
    pub fn new(registry: ModuleRegistry, templates: TemplateStore) -> Self {
        Self {
            registry: Arc::new(registry),
            templates: Arc::new(templates),
            prometheus: None,
        }
    }

    /// Attach a Prometheus exposition handle.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("module", &self.registry.technical_name())
            .field("templates", &self.templates.names())
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Module status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Host status.
    pub status: &'static str,
    /// Technical module name.
    pub module: String,
    /// Display name from the descriptor.
    pub name: String,
    /// Module version.
    pub version: String,
    /// Whether the module is a top-level application.
    pub application: bool,
    /// Number of registered views.
    pub views: usize,
    /// Number of registered menus.
    pub menus: usize,
    /// Number of registered assets.
    pub assets: usize,
    /// When the registry was populated (RFC 3339).
    pub loaded_at: String,
}

/// Dashboard handler - renders the index view with an empty context.
///
/// Query parameters are accepted and ignored; the response depends only on
/// the registered template.
pub async fn dashboard(State(state): State<AppState>) -> Response {
    metrics::inc_dashboard_requests();
    let start = Instant::now();

    match state.templates.render_empty(INDEX_TEMPLATE) {
        Ok(body) => {
            metrics::record_render_latency(start);
            Html(body).into_response()
        }
        Err(e) => {
            metrics::inc_render_failures();
            error!("Failed to render {}: {}", INDEX_TEMPLATE, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "template rendering failed").into_response()
        }
    }
}

/// Static asset handler - serves declared bundle files from the registry.
pub async fn asset(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    metrics::inc_asset_requests();

    match state.registry.asset(&path) {
        Some(asset) => {
            ([(header::CONTENT_TYPE, asset.content_type)], asset.body.clone()).into_response()
        }
        None => {
            debug!("Asset not declared: {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Status handler - returns module metadata and registry counts.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let registry = &state.registry;
    let manifest = registry.manifest();

    Json(StatusResponse {
        status: "running",
        module: registry.technical_name().to_string(),
        name: manifest.name.clone(),
        version: manifest.version.clone(),
        application: manifest.application,
        views: registry.views().len(),
        menus: registry.menus().count(),
        assets: registry.asset_count(),
        loaded_at: registry
            .loaded_at()
            .format(&Rfc3339)
            .unwrap_or_default(),
    })
}

/// Prometheus metrics handler.
pub async fn metrics_text(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}
