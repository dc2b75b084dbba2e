//! Dispatcher - main loop for fan-out to export sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{ExportRecord, SinkConfig, SinkType, StorageConfig};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{CsvSink, LogSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
    /// Default storage paths for CSV sinks
    pub storage: StorageConfig,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<ExportRecord>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<ExportRecord>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config)?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(config: &DispatcherConfig) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config, &config.storage)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, storage),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(
    config: &SinkConfig,
    storage: &StorageConfig,
) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Csv => {
            let sink = CsvSink::from_params(
                &config.name,
                &config.params,
                &storage.summary_csv,
                &storage.samples_csv,
            );
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// The main Dispatcher that fans out export records to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<ExportRecord>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<ExportRecord>) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes export records from input and fans out to all sinks.
    /// Returns when input channel is closed.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut record_count: u64 = 0;

        while let Some(record) = self.input_rx.recv().await {
            record_count += 1;
            debug!(
                record = record_count,
                wavelength_nm = record.report.wavelength_nm,
                "Dispatching export record"
            );
            self.dispatch_record(&record);
        }

        info!(
            records = record_count,
            "Dispatcher input closed, shutting down"
        );

        Self::shutdown_handles(self.handles).await;

        info!("Dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn dispatch_record(&self, record: &ExportRecord) {
        for handle in &self.handles {
            handle.try_send(record.clone());
        }
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, storage, input_rx))]
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    storage: StorageConfig,
    input_rx: mpsc::Receiver<ExportRecord>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
        storage,
    };
    DispatcherBuilder::new(config, input_rx).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::StatsReport;
    use std::collections::HashMap;

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

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let sink1 = LogSink::new("sink1");
        let sink2 = LogSink::new("sink2");

        let handles = vec![SinkHandle::spawn(sink1, 10), SinkHandle::spawn(sink2, 10)];

        let dispatcher = Dispatcher::with_handles(handles, input_rx);
        let handle = dispatcher.spawn();

        for _ in 0..5 {
            input_tx.send(record()).await.unwrap();
        }

        // Close input channel
        drop(input_tx);

        // Wait for dispatcher to finish
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let (input_tx, input_rx) = mpsc::channel(10);

        let configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 50,
            params: HashMap::new(),
        }];
        let storage = StorageConfig {
            summary_csv: dir.path().join("summary.csv"),
            samples_csv: dir.path().join("samples.csv"),
            qe_table: None,
        };

        let dispatcher = create_dispatcher(configs, storage, input_rx).unwrap();
        let handle = dispatcher.spawn();

        input_tx.send(record()).await.unwrap();

        drop(input_tx);
        handle.await.unwrap();
    }
}
