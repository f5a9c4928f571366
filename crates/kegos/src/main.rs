//! # kegos
//!
//! Google Workspace to Keycloak group membership sync daemon.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use kegos::{daemon, logging, Cli, DaemonConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match DaemonConfig::from_cli(cli) {
        Ok(config) => config,
        Err(errors) => {
            eprint!("{errors}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(config.log_level, config.log_format) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match daemon::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "kegos stopped");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
