//! The `run` command: the interactive calibration console

use anyhow::{Context, Result};
use tracing::{info, warn};

use config_loader::{CalibrationBlueprint, ConfigLoader};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the run command
pub async fn execute(args: RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(&args)?;
    apply_overrides(&mut blueprint, &args);
    ConfigLoader::validate(&blueprint).context("configuration invalid after overrides")?;

    let Some(wavelength_nm) = blueprint.stats.wavelength_nm else {
        anyhow::bail!("no stimulus wavelength, pass --wavelength or set stats.wavelength_nm");
    };

    if args.dry_run {
        print_dry_run(&blueprint, wavelength_nm, args.mock);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        wavelength_nm,
        mock: args.mock,
    });

    tokio::select! {
        result = pipeline.run() => {
            let stats = result?;
            stats.print_summary();
        }
        _ = shutdown_signal() => {
            warn!("interrupted, shutting down");
        }
    }

    Ok(())
}

fn load_blueprint(args: &RunArgs) -> Result<CalibrationBlueprint> {
    if args.config.exists() {
        let blueprint = ConfigLoader::load_from_path(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?;
        info!(path = %args.config.display(), "configuration loaded");
        Ok(blueprint)
    } else {
        info!(
            path = %args.config.display(),
            "configuration file not found, using defaults"
        );
        Ok(CalibrationBlueprint::default())
    }
}

/// Command-line overrides win over the file
fn apply_overrides(blueprint: &mut CalibrationBlueprint, args: &RunArgs) {
    if let Some(port) = &args.port {
        blueprint.device.port = port.clone();
    }
    if let Some(baud) = args.baud {
        blueprint.device.baud = baud;
    }
    if let Some(samples) = args.samples {
        blueprint.stats.sample_count = samples;
    }
    if let Some(wavelength) = args.wavelength {
        blueprint.stats.wavelength_nm = Some(wavelength);
    }
    if let Some(path) = &args.summary_csv {
        blueprint.storage.summary_csv = path.clone();
    }
    if let Some(path) = &args.samples_csv {
        blueprint.storage.samples_csv = path.clone();
    }
    if let Some(capacity) = args.buffer_size {
        blueprint.queues.capacity = capacity;
    }
}

fn print_dry_run(blueprint: &CalibrationBlueprint, wavelength_nm: u32, mock: bool) {
    println!("Configuration OK");
    if mock {
        println!("  Device:      synthetic");
    } else {
        println!(
            "  Device:      {} @ {} baud",
            blueprint.device.port, blueprint.device.baud
        );
    }
    println!("  Samples:     {}", blueprint.stats.sample_count);
    println!("  Wavelength:  {wavelength_nm} nm");
    println!(
        "  Summary CSV: {}",
        blueprint.storage.summary_csv.display()
    );
    println!(
        "  Samples CSV: {}",
        blueprint.storage.samples_csv.display()
    );
    println!(
        "  Sinks:       {}",
        blueprint
            .sinks
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
