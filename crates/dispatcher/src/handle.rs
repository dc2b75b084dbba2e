//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{ExportRecord, ExportSink};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send records to worker
    tx: mpsc::Sender<ExportRecord>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: ExportSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Send a record to the sink (non-blocking)
    ///
    /// Returns true if sent, false if queue full (record dropped)
    pub fn try_send(&self, record: ExportRecord) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => {
                // Update queue length approximation
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(r)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    sink = %self.name,
                    wavelength_nm = r.report.wavelength_nm,
                    "Queue full, export record dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes export records and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: ExportSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<ExportRecord>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(record) = rx.recv().await {
        // Update queue length
        metrics.set_queue_len(rx.len());

        match sink.write(&record).await {
            Ok(()) => {
                metrics.inc_write_count();
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    sink = %name,
                    wavelength_nm = record.report.wavelength_nm,
                    error = %e,
                    "Write failed"
                );
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{CalibrationError, StatsReport};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    fn record() -> ExportRecord {
        ExportRecord {
            timestamp: Utc::now(),
            report: StatsReport {
                sample_count: 3,
                wavelength_nm: 525,
                exposure_ms: 50.0,
                gain: 16.0,
                channels: Vec::new(),
            },
            photodiode_na: 100.0,
            quantum_efficiency: 0.5,
            raw_samples: Vec::new(),
        }
    }

    /// Mock sink for testing
    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl ExportSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _record: &ExportRecord) -> Result<(), CalibrationError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(CalibrationError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), CalibrationError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), CalibrationError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let write_count = Arc::new(AtomicU64::new(0));
        let sink = MockSink {
            name: "test".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 0,
        };

        let handle = SinkHandle::spawn(sink, 10);

        for _ in 0..5 {
            assert!(handle.try_send(record()));
        }

        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let write_count = Arc::new(AtomicU64::new(0));
        let sink = MockSink {
            name: "slow".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 100, // Slow sink
        };

        // Small queue capacity
        let handle = SinkHandle::spawn(sink, 2);

        // Send more than queue can hold
        for _ in 0..10 {
            handle.try_send(record());
        }

        // Some should have been dropped
        assert!(handle.metrics().dropped_count() > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let sink = MockSink {
            name: "failing".to_string(),
            write_count: Arc::new(AtomicU64::new(0)),
            should_fail: true,
            delay_ms: 0,
        };

        let handle = SinkHandle::spawn(sink, 10);

        for _ in 0..3 {
            handle.try_send(record());
        }

        // Give worker time to process
        sleep(Duration::from_millis(50)).await;

        // Should have recorded failures
        assert!(handle.metrics().failure_count() > 0);

        handle.shutdown().await;
    }
}
