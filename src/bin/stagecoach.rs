//! Stagecoach host binary
//!
//! Loads startup parameters, installs logging, then drives a headless startup.

use clap::Parser;
use stagecoach::cli::{execute, Cli};
use stagecoach::logging::init_logging;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let params = match cli.startup_parameters() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Failed to load startup parameters: {:#}", e);
            process::exit(1);
        }
    };

    let logging_config = cli.logging_config(&params.logging);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!(platform = params.platform.as_str(), "Stagecoach starting");

    match execute(&cli, &params) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}
