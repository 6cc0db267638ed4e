use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_LISTEN_ADDRESS: &str = ":9070";
pub const DEFAULT_TELEMETRY_PATH: &str = "/metrics";
pub const HEALTH_PATH: &str = "/health";

/// The HTTP side of the exporter.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(default)]
pub struct WebConfig {
    /// Address to listen on. A bare `:port` listens on all interfaces.
    pub listen_address: String,
    /// Path under which metrics are exposed.
    pub telemetry_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            telemetry_path: DEFAULT_TELEMETRY_PATH.to_string(),
        }
    }
}

impl WebConfig {
    /// The listen address in a form `TcpListener::bind` accepts.
    pub fn bind_address(&self) -> String {
        let address = self.listen_address.trim();
        match address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => address.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_address.trim().is_empty() {
            return Err(ConfigError::invalid("web.listen_address", "must not be empty"));
        }
        if !self.telemetry_path.starts_with('/') {
            return Err(ConfigError::invalid(
                "web.telemetry_path",
                format!("'{}' must start with '/'", self.telemetry_path),
            ));
        }
        if self.telemetry_path == HEALTH_PATH {
            return Err(ConfigError::invalid(
                "web.telemetry_path",
                format!("'{}' is reserved for the health check", HEALTH_PATH),
            ));
        }
        Ok(())
    }
}
