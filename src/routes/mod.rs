//! HTTP route definitions and handlers.
//!
//! Two groups: the Prometheus telemetry endpoint and the health check.

mod health_routes;
mod metrics;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// The telemetry endpoint is mounted at the configured path, and the
/// application state is attached for access in handlers.
pub fn create_router(state: AppState) -> Router {
    let telemetry_path = state.config.web.telemetry_path.clone();
    Router::new()
        .merge(metrics::routes(&telemetry_path))
        .merge(health_routes::routes())
        .with_state(state)
}
