//! The `validate` command: check a configuration file without running

use anyhow::Result;
use serde::Serialize;

use config_loader::{CalibrationBlueprint, ConfigLoader};

use crate::cli::ValidateArgs;

/// Validation outcome, printable as text or JSON
#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

/// Compact view of a valid configuration
#[derive(Debug, Serialize)]
struct ConfigSummary {
    port: String,
    baud: u32,
    sample_count: usize,
    wavelength_nm: Option<u32>,
    queue_capacity: usize,
    summary_csv: String,
    samples_csv: String,
    sinks: Vec<String>,
}

impl ConfigSummary {
    fn from_blueprint(blueprint: &CalibrationBlueprint) -> Self {
        Self {
            port: blueprint.device.port.clone(),
            baud: blueprint.device.baud,
            sample_count: blueprint.stats.sample_count,
            wavelength_nm: blueprint.stats.wavelength_nm,
            queue_capacity: blueprint.queues.capacity,
            summary_csv: blueprint.storage.summary_csv.display().to_string(),
            samples_csv: blueprint.storage.samples_csv.display().to_string(),
            sinks: blueprint
                .sinks
                .iter()
                .map(|s| format!("{} ({:?})", s.name, s.sink_type))
                .collect(),
        }
    }
}

/// Execute the validate command
pub async fn execute(args: ValidateArgs) -> Result<()> {
    let result = validate(&args);
    let valid = result.valid;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text(&result);
    }

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

fn validate(args: &ValidateArgs) -> ValidationResult {
    let path = args.config.display().to_string();
    match ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path: path,
            errors: Vec::new(),
            warnings: collect_warnings(&blueprint),
            summary: Some(ConfigSummary::from_blueprint(&blueprint)),
        },
        Err(error) => ValidationResult {
            valid: false,
            config_path: path,
            errors: vec![error.to_string()],
            warnings: Vec::new(),
            summary: None,
        },
    }
}

fn collect_warnings(blueprint: &CalibrationBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    if blueprint.stats.wavelength_nm.is_none() {
        warnings.push(
            "no stats.wavelength_nm, --wavelength will be required at run time".to_string(),
        );
    }
    if blueprint.sinks.is_empty() {
        warnings.push("no sinks configured, saved runs will go nowhere".to_string());
    }
    if blueprint.storage.qe_table.is_none() {
        warnings.push("no storage.qe_table, using the embedded reference dataset".to_string());
    }
    warnings
}

fn print_text(result: &ValidationResult) {
    if result.valid {
        println!("Configuration valid: {}", result.config_path);
    } else {
        println!("Configuration INVALID: {}", result.config_path);
        for error in &result.errors {
            println!("  error: {error}");
        }
    }
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    if let Some(summary) = &result.summary {
        println!("  device:  {} @ {} baud", summary.port, summary.baud);
        println!(
            "  window:  {} samples, wavelength {}",
            summary.sample_count,
            summary
                .wavelength_nm
                .map(|nm| format!("{nm} nm"))
                .unwrap_or_else(|| "unset".to_string())
        );
        println!("  storage: {} / {}", summary.summary_csv, summary.samples_csv);
        println!("  sinks:   {}", summary.sinks.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_has_summary() {
        let file = write_config(
            r#"
[stats]
sample_count = 10
wavelength_nm = 525
"#,
        );
        let result = validate(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.sample_count, 10);
        assert_eq!(summary.wavelength_nm, Some(525));
    }

    #[test]
    fn test_missing_wavelength_warns() {
        let file = write_config("");
        let result = validate(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("wavelength")));
    }

    #[test]
    fn test_invalid_config_reports_errors() {
        let file = write_config("[stats]\nsample_count = 1\n");
        let result = validate(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });
        assert!(!result.valid);
        assert!(!result.errors.is_empty());
        assert!(result.summary.is_none());
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate(&ValidateArgs {
            config: "nope/nothing.toml".into(),
            json: false,
        });
        assert!(!result.valid);
    }
}
