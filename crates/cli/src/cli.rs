//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Speccal - AS7262 spectral sensor calibration console
#[derive(Parser, Debug)]
#[command(
    name = "speccal",
    author,
    version,
    about = "AS7262 spectral sensor calibration pipeline",
    long_about = "An interactive calibration console for the AS7262 six-band spectral sensor.\n\n\
                  Reads frames from the device over a serial port, accumulates a fixed-size\n\
                  sampling window per channel, and appends per-run statistics to CSV files."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SPECCAL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "SPECCAL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive calibration console
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "speccal.toml", env = "SPECCAL_CONFIG")]
    pub config: PathBuf,

    /// Override serial port from configuration
    #[arg(long, env = "SPECCAL_PORT")]
    pub port: Option<String>,

    /// Override baud rate from configuration
    #[arg(long, env = "SPECCAL_BAUD")]
    pub baud: Option<u32>,

    /// Override samples per channel window
    #[arg(long, env = "SPECCAL_SAMPLES")]
    pub samples: Option<usize>,

    /// Stimulus wavelength in nm (required here or in the config)
    #[arg(short, long, env = "SPECCAL_WAVELENGTH")]
    pub wavelength: Option<u32>,

    /// Override summary CSV path
    #[arg(long, env = "SPECCAL_SUMMARY_CSV")]
    pub summary_csv: Option<PathBuf>,

    /// Override per-sample CSV path
    #[arg(long, env = "SPECCAL_SAMPLES_CSV")]
    pub samples_csv: Option<PathBuf>,

    /// Run against a synthetic device instead of a serial port
    #[arg(long)]
    pub mock: bool,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Override classifier queue capacity
    #[arg(long, env = "SPECCAL_BUFFER_SIZE")]
    pub buffer_size: Option<usize>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SPECCAL_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "speccal.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "speccal.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
