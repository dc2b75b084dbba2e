//! ExportSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for export sinks.

use crate::{CalibrationError, ExportRecord};

/// Export output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(ExportSink: Send)]
pub trait LocalExportSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one completed calibration record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, record: &ExportRecord) -> Result<(), CalibrationError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), CalibrationError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), CalibrationError>;
}
