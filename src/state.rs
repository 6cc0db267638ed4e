//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! the configuration and the metrics registry with its collector.

use crate::config::ConfigV1;
use crate::metrics::Metrics;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// This state is cloned for each request handler; clones share the same
/// registry and gauges.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Registry holding the NameNode collector.
    pub metrics: Metrics,
}
