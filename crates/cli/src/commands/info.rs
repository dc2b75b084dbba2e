//! The `info` command: display the effective configuration

use anyhow::{Context, Result};
use tracing::info;

use config_loader::{CalibrationBlueprint, ConfigLoader};

use crate::cli::InfoArgs;

/// Execute the info command
pub async fn execute(args: InfoArgs) -> Result<()> {
    let blueprint = if args.config.exists() {
        ConfigLoader::load_from_path(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?
    } else {
        info!(path = %args.config.display(), "configuration file not found, showing defaults");
        CalibrationBlueprint::default()
    };

    if args.json {
        println!("{}", ConfigLoader::to_json(&blueprint)?);
    } else {
        println!("{}", ConfigLoader::to_toml(&blueprint)?);
    }

    if args.sinks {
        print_sinks(&blueprint);
    }

    Ok(())
}

fn print_sinks(blueprint: &CalibrationBlueprint) {
    println!("Sinks ({}):", blueprint.sinks.len());
    for sink in &blueprint.sinks {
        println!(
            "  {} - type {:?}, queue capacity {}",
            sink.name, sink.sink_type, sink.queue_capacity
        );
        for (key, value) in &sink.params {
            println!("    {key} = {value}");
        }
    }
}
