//! speccal - interactive calibration console for the AS7262 spectral sensor

mod cli;
mod commands;
mod console;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present, ignore if missing
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    // The Prometheus endpoint only makes sense for a running pipeline
    let metrics_port = match &cli.command {
        Commands::Run(args) if args.metrics_port > 0 => Some(args.metrics_port),
        _ => None,
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.clone().into(),
        metrics_port,
        default_log_level: default_log_level.to_string(),
    })?;

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Info(args) => commands::info::execute(args).await,
    };

    if let Err(error) = &result {
        tracing::error!(error = %error, "command failed");
    }

    result
}
