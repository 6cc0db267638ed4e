//! Health check endpoints.

use crate::config::HEALTH_PATH;
use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health_check))
}

/// Simple liveness probe.
///
/// Returns 200 OK as long as the server is up; it does not contact the NameNode.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
