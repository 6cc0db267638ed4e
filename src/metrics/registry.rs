//! Registry wrapper rendering the collector in Prometheus text format.

use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

use crate::collector::NameNodeCollector;

/// Prometheus registry holding the NameNode collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    collector: NameNodeCollector,
}

impl Metrics {
    /// Creates a registry and registers a clone of `collector` with it.
    pub fn new(collector: NameNodeCollector) -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());
        registry.register(Box::new(collector.clone()))?;

        Ok(Metrics {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> &NameNodeCollector {
        &self.collector
    }

    /// Refreshes the collector from the NameNode, then renders the registry.
    ///
    /// A failed refresh is logged by the collector and the previous values are
    /// rendered; only an encoding failure is returned.
    pub async fn scrape(&self) -> Result<String, prometheus::Error> {
        self.collector.refresh().await;
        self.render()
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics encoding produced invalid UTF-8: {}", e)))
    }
}
