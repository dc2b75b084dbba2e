//! LogSink - logs saved runs via tracing

use contracts::{CalibrationError, ExportRecord, ExportSink};
use tracing::{info, instrument};

/// Sink that logs export summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_record_summary(&self, record: &ExportRecord) {
        info!(
            sink = %self.name,
            wavelength_nm = record.report.wavelength_nm,
            samples = record.report.sample_count,
            photodiode_na = record.photodiode_na,
            quantum_efficiency = record.quantum_efficiency,
            raw_samples = record.raw_samples.len(),
            "Calibration run exported"
        );
    }
}

impl ExportSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, record),
        fields(sink = %self.name, wavelength_nm = record.report.wavelength_nm)
    )]
    async fn write(&mut self, record: &ExportRecord) -> Result<(), CalibrationError> {
        self.log_record_summary(record);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CalibrationError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CalibrationError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
