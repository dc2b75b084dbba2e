//! End-of-session statistics reporting

use std::time::Duration;

use ingestion::MetricsSnapshot;

/// Statistics collected over one console session
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Wall-clock session duration
    pub duration: Duration,
    /// Ingestion-side counters
    pub ingestion: MetricsSnapshot,
    /// Sampling windows completed
    pub windows_completed: u64,
    /// Calibration runs exported
    pub runs_saved: u64,
}

impl PipelineStats {
    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        println!();
        println!("=== Session Statistics ===");
        println!("Duration:          {:.1}s", self.duration.as_secs_f64());
        println!("Lines received:    {}", self.ingestion.lines_received);
        println!("Readings decoded:  {}", self.ingestion.readings_decoded);
        println!("Decode errors:     {}", self.ingestion.decode_errors);
        println!("Readings dropped:  {}", self.ingestion.readings_dropped);
        println!("Windows completed: {}", self.windows_completed);
        println!("Runs saved:        {}", self.runs_saved);
    }
}
