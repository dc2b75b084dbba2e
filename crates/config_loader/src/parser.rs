//! Config parsing module
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{CalibrationBlueprint, CalibrationError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse configuration content into a blueprint
pub fn parse(
    content: &str,
    format: ConfigFormat,
) -> Result<CalibrationBlueprint, CalibrationError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| {
            CalibrationError::ConfigParse {
                message: format!("TOML parse error: {e}"),
                source: Some(Box::new(e)),
            }
        }),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| {
            CalibrationError::ConfigParse {
                message: format!("JSON parse error: {e}"),
                source: Some(Box::new(e)),
            }
        }),
    }
}
