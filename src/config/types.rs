use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::namenode::NameNodeConfig;
use super::web::WebConfig;
use crate::cli::Cli;
use crate::error::ConfigError;

/// Prefix of environment variables overriding the configuration, nested keys
/// separated by `__` (e.g. `NAMENODE_EXPORTER_NAMENODE__JMX_URL`).
pub const ENV_PREFIX: &str = "NAMENODE_EXPORTER_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub namenode: NameNodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigV1 {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.web.validate()?;
        self.namenode.validate()?;
        self.logging.level_filter()?;
        Ok(())
    }
}

/// Built-in defaults, the base layer every other source merges onto.
pub fn defaults() -> Figment {
    Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
}

/// Defaults, then the optional YAML file, then the environment, then flags.
pub fn build_figment(cli: &Cli) -> Result<Figment, ConfigError> {
    let mut figment = defaults();
    if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.display().to_string()));
        }
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
    Ok(with_cli_overrides(figment, cli))
}

/// Layers the flags that were given on top of `figment`.
pub fn with_cli_overrides(figment: Figment, cli: &Cli) -> Figment {
    let strings = [
        ("web.listen_address", &cli.listen_address),
        ("web.telemetry_path", &cli.telemetry_path),
        ("namenode.jmx_url", &cli.jmx_url),
        ("logging.level", &cli.log_level),
        ("logging.format", &cli.log_format),
    ];

    let mut figment = figment;
    for (key, value) in strings {
        if let Some(value) = value {
            figment = figment.merge(Serialized::default(key, value));
        }
    }
    if let Some(timeout) = cli.timeout_in_ms {
        figment = figment.merge(Serialized::default("namenode.timeout_in_ms", timeout));
    }
    figment
}

/// Extracts and validates the configuration from a figment.
pub fn extract(figment: &Figment) -> Result<ConfigV1, ConfigError> {
    let config = match figment.extract::<Config>()? {
        Config::ConfigV1(c) => c,
    };
    // handle configuration migration between versions here when necessary
    config.validate()?;
    Ok(config)
}

/// Loads the configuration from every source named by the command line.
pub fn load_config(cli: &Cli) -> Result<ConfigV1, ConfigError> {
    extract(&build_figment(cli)?)
}

/// The JSON schema of the configuration file.
pub fn schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(Config))
}
