use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::ConfigError;

/// Installs the global tracing subscriber.
///
/// The configured level is the global default; `RUST_LOG` directives, when
/// set, are kept next to it (e.g. `RUST_LOG=hyper=debug` only raises hyper).
/// Records emitted through the `log` facade by dependencies (reqwest, hyper)
/// are bridged into tracing by the subscriber's `tracing-log` integration.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), ConfigError> {
    let level_filter = logging_config.level_filter()?;

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter_layer = env_filter(level_filter, rust_log.as_deref());

    match logging_config.format {
        LogFormat::Json => {
            // Structured output, one object per line with event fields flattened
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .init();
        }
        LogFormat::Console => {
            // Human-readable console output with ANSI colors
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

/// The configured level as global directive plus whatever `rust_log` adds.
fn env_filter(level_filter: LevelFilter, rust_log: Option<&str>) -> EnvFilter {
    let filter = match rust_log {
        Some(directives) => EnvFilter::builder().parse_lossy(directives),
        None => EnvFilter::default(),
    };
    filter.add_directive(level_filter.into())
}
