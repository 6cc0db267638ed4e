use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_JMX_URL: &str = "http://localhost:50070/jmx";
pub const DEFAULT_TIMEOUT_IN_MS: u64 = 5000;

/// Where and how to reach the NameNode JMX servlet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(default)]
pub struct NameNodeConfig {
    /// Full URL of the `/jmx` endpoint.
    pub jmx_url: String,
    /// Timeout of the whole JMX request, body included.
    pub timeout_in_ms: u64,
}

impl Default for NameNodeConfig {
    fn default() -> Self {
        Self {
            jmx_url: DEFAULT_JMX_URL.to_string(),
            timeout_in_ms: DEFAULT_TIMEOUT_IN_MS,
        }
    }
}

impl NameNodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.jmx_url)
            .map_err(|e| ConfigError::invalid("namenode.jmx_url", format!("'{}': {}", self.jmx_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "namenode.jmx_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.timeout_in_ms == 0 {
            return Err(ConfigError::invalid(
                "namenode.timeout_in_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = NameNodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_urls_and_zero_timeout() {
        let not_a_url = NameNodeConfig {
            jmx_url: "localhost:50070/jmx".to_string(),
            ..NameNodeConfig::default()
        };
        assert!(not_a_url.validate().is_err());

        let ftp = NameNodeConfig {
            jmx_url: "ftp://namenode/jmx".to_string(),
            ..NameNodeConfig::default()
        };
        assert!(ftp.validate().is_err());

        let no_timeout = NameNodeConfig {
            timeout_in_ms: 0,
            ..NameNodeConfig::default()
        };
        assert!(no_timeout.validate().is_err());
    }
}
