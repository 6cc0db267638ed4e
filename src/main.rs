use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use namenode_exporter::cli::Cli;
use namenode_exporter::config::{load_config, schema};
use namenode_exporter::startup;
use namenode_exporter::utils::logger::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_schema {
        return match schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error rendering configuration schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    match startup::run(Arc::new(config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event_name = "server.fatal", event_domain = "server", error = %e, "Exporter stopped");
            ExitCode::FAILURE
        }
    }
}
