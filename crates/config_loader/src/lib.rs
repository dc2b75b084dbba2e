//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `CalibrationBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("speccal.toml")).unwrap();
//! println!("Port: {}", blueprint.device.port);
//! ```

mod parser;
mod validator;

pub use contracts::CalibrationBlueprint;
pub use parser::ConfigFormat;

use contracts::CalibrationError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<CalibrationBlueprint, CalibrationError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<CalibrationBlueprint, CalibrationError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize CalibrationBlueprint to TOML string
    pub fn to_toml(blueprint: &CalibrationBlueprint) -> Result<String, CalibrationError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| CalibrationError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize CalibrationBlueprint to JSON string
    pub fn to_json(blueprint: &CalibrationBlueprint) -> Result<String, CalibrationError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| CalibrationError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Re-run validation on an already-built blueprint
    ///
    /// For callers that mutate a loaded blueprint (CLI overrides).
    pub fn validate(blueprint: &CalibrationBlueprint) -> Result<(), CalibrationError> {
        validator::validate(blueprint)
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, CalibrationError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CalibrationError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            CalibrationError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, CalibrationError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[device]
port = "/dev/ttyUSB1"
baud = 115200

[stats]
sample_count = 25
wavelength_nm = 525

[storage]
summary_csv = "out/summary.csv"
samples_csv = "out/samples.csv"

[[sinks]]
name = "csv"
sink_type = "csv"

[[sinks]]
name = "log"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.device.port, "/dev/ttyUSB1");
        assert_eq!(bp.stats.wavelength_nm, Some(525));
    }

    #[test]
    fn test_defaults_apply() {
        let bp = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(bp.device.port, "/dev/ttyUSB0");
        assert_eq!(bp.device.baud, 115_200);
        assert_eq!(bp.stats.sample_count, 25);
        assert_eq!(bp.sinks.len(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.device.port, bp2.device.port);
        assert_eq!(bp.stats.sample_count, bp2.stats.sample_count);
        assert_eq!(bp.sinks.len(), bp2.sinks.len());
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.device.port, bp2.device.port);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate sink name should fail validation
        let content = r#"
[stats]
wavelength_nm = 525

[[sinks]]
name = "csv"
sink_type = "csv"

[[sinks]]
name = "csv"
sink_type = "log"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
