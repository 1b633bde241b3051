//! CLI: clap types and command execution for the `stagecoach` host binary.

use crate::config::{ConfigLoader, StartupParameters};
use crate::coordinator::LifecycleCoordinator;
use crate::driver::drive_startup;
use crate::logging::LoggingConfig;
use crate::run_loop::QueuedRunLoop;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Stagecoach - staged startup for multi-process hosts
#[derive(Parser, Debug)]
#[command(name = "stagecoach")]
#[command(about = "Staged startup coordinator for multi-process host applications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a full startup and print the startup report as JSON
    Run {
        /// Leave the main loop to an external test harness
        #[arg(long)]
        test_harness: bool,
        /// Directory of the persistent store
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the resolved startup parameters as TOML
    ShowConfig,
}

impl Cli {
    /// Load startup parameters and apply command-line overrides.
    pub fn startup_parameters(&self) -> anyhow::Result<StartupParameters> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }
        let mut params = loader.load()?;

        if let Commands::Run {
            test_harness,
            data_dir,
        } = &self.command
        {
            if *test_harness {
                params.test_harness = true;
            }
            if let Some(dir) = data_dir {
                params.storage.data_dir = Some(dir.clone());
            }
        }
        params.validate()?;
        Ok(params)
    }

    /// Logging configuration: CLI flags override the config file.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        config
    }
}

/// Execute the parsed command and return what should be printed.
pub fn execute(cli: &Cli, params: &StartupParameters) -> anyhow::Result<String> {
    match &cli.command {
        Commands::Run { .. } => {
            let mut coordinator = LifecycleCoordinator::headless(params);
            let mut run_loop = QueuedRunLoop::new();
            let report = drive_startup(&mut coordinator, &mut run_loop)?;
            info!(phases = report.phases.len(), "Startup finished");
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Commands::ShowConfig => Ok(params.to_toml()?),
    }
}
