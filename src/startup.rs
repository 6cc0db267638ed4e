//! Application startup and server initialization.
//!
//! This module builds the collector and its registry, sets up the routes and
//! serves them until a shutdown signal arrives.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::collector::NameNodeCollector;
use crate::config::ConfigV1;
use crate::error::StartupError;
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;

/// Builds the collector, the registry and the shared state from a configuration.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, StartupError> {
    let collector = NameNodeCollector::new(&config.namenode)?;
    let metrics = Metrics::new(collector)?;
    Ok(AppState { config, metrics })
}

/// Initializes and runs the exporter.
///
/// Binds to the configured listen address and serves the telemetry and health
/// routes until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the state cannot be built, the server fails to bind to
/// the listen address, or it encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), StartupError> {
    let state = build_state(config.clone())?;
    let app = routes::create_router(state);

    let address = config.web.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    info!(
        event_name = "server.started",
        event_domain = "server",
        listen_address = address.as_str(),
        telemetry_path = config.web.telemetry_path.as_str(),
        jmx_url = config.namenode.jmx_url.as_str(),
        "Starting server on {}",
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!(event_name = "server.stopped", event_domain = "server", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
