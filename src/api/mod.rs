//! HTTP API module for the dashboard page, assets, and host endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
