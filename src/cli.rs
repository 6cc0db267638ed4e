//! Command-line flags. Flag names follow the usual Prometheus exporter layout.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "namenode-exporter",
    version,
    about = "Exports HDFS NameNode FSNamesystem metrics for Prometheus"
)]
pub struct Cli {
    /// Optional YAML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address on which to expose metrics and web interface.
    #[arg(long = "web.listen-address", value_name = "ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", value_name = "PATH")]
    pub telemetry_path: Option<String>,

    /// Hadoop JMX URL.
    #[arg(long = "namenode.jmx.url", value_name = "URL")]
    pub jmx_url: Option<String>,

    /// Timeout of the JMX request in milliseconds.
    #[arg(long = "namenode.timeout-ms", value_name = "MILLIS")]
    pub timeout_in_ms: Option<u64>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long = "log.level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format: json or console.
    #[arg(long = "log.format", value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Print the JSON schema of the configuration file and exit.
    #[arg(long)]
    pub print_schema: bool,
}
