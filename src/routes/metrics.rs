//! Metrics exposition endpoint.

use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tracing::error;

/// Creates the metrics route under `path`.
pub fn routes(path: &str) -> Router<AppState> {
    Router::new().route(path, get(metrics_handler))
}

/// Handler for the telemetry endpoint.
///
/// Every request triggers one NameNode JMX fetch before the registry is
/// rendered, so the response carries the freshest values available. An
/// unreachable NameNode still yields 200 with the previous values.
async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HTTPError> {
    let metrics_text = state.metrics.scrape().await.map_err(|e| {
        error!(
            event_name = "metrics.render.failed",
            event_domain = "metrics",
            error = %e,
            "could not encode metrics"
        );
        HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "could not encode metrics")
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        metrics_text,
    ))
}
