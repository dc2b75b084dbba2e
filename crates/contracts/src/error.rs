//! Layered error definitions
//!
//! Categorized by source: config / orchestration / transport / sink.
//! Decode failures stay local to the ingestion crate; they are recovered
//! at the decoder and never cross a crate boundary.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CalibrationError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Orchestration Errors =====
    /// A `save` precondition failed; surfaced to the console, no state change
    #[error("{message}")]
    Precondition { message: String },

    /// No quantum-efficiency entry for the requested wavelength.
    /// Fatal for the current save attempt only.
    #[error("no quantum efficiency entry for {wavelength_nm} nm")]
    QeLookup { wavelength_nm: u32 },

    // ===== Transport Errors =====
    /// Underlying serial channel failure; not recoverable by the core
    #[error("transport error: {message}")]
    Transport { message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CalibrationError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
