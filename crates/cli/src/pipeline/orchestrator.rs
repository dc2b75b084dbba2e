//! Pipeline orchestrator
//!
//! Wires the full session together: transport, ingestion pipeline,
//! calibration state machine, dispatcher and console. The orchestrator
//! owns the event loop that feeds console commands and decoded readings
//! into the [`Calibrator`] and performs the effects it returns.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use calibration::{Calibrator, QeTable};
use contracts::{CalibrationBlueprint, CalibrationError, CalibrationEvent, Effect, Transport};
use dispatcher::format::render_report;
use dispatcher::{create_dispatcher, Dispatcher};
use ingestion::{BackpressureConfig, IngestionPipeline, MockTransport, StreamingControl};

use crate::console::{display_prompt, spawn_console};
use crate::pipeline::PipelineStats;

/// How long to wait for sinks to flush on shutdown
const DISPATCHER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Frame interval for the synthetic device
const MOCK_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the orchestrator needs to run one session
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated configuration, CLI overrides already applied
    pub blueprint: CalibrationBlueprint,
    /// Stimulus wavelength for this session
    pub wavelength_nm: u32,
    /// Use the synthetic device instead of a serial port
    pub mock: bool,
}

/// The calibration session pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the session until the operator quits
    pub async fn run(self) -> Result<PipelineStats> {
        if self.config.mock {
            info!("using synthetic device");
            let transport = MockTransport::synthetic(MOCK_FRAME_INTERVAL);
            return self.run_with_transport(transport).await;
        }

        #[cfg(feature = "serial")]
        {
            let device = &self.config.blueprint.device;
            let transport = ingestion::SerialTransport::open(&device.port, device.baud)
                .with_context(|| format!("failed to open serial port {}", device.port))?;
            info!(port = %device.port, baud = device.baud, "serial port opened");
            self.run_with_transport(transport).await
        }
        #[cfg(not(feature = "serial"))]
        {
            anyhow::bail!("built without serial support, run with --mock")
        }
    }

    async fn run_with_transport<T: Transport + Send + 'static>(
        self,
        transport: T,
    ) -> Result<PipelineStats> {
        let blueprint = self.config.blueprint;
        let started = Instant::now();

        let qe_table = match &blueprint.storage.qe_table {
            Some(path) => QeTable::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => QeTable::embedded().context("embedded quantum efficiency table")?,
        };
        let mut calibrator = Calibrator::new(
            blueprint.stats.sample_count,
            self.config.wavelength_nm,
            qe_table,
        );

        let mut ingest =
            IngestionPipeline::new(transport, &BackpressureConfig::from_blueprint(&blueprint.queues));
        let control = ingest.control();
        let spectral = ingest.spectral_receiver();
        let ambient = ingest.ambient_receiver();
        let mut device_ready = ingest.device_ready_receiver();
        let ingest_metrics = ingest.metrics();
        let mut ingest_handle = ingest.spawn();

        // Nothing consumes ambient samples yet; drain the queue so a
        // blocking policy cannot stall the router on a full queue
        let ambient_drain = tokio::spawn(async move {
            while let Ok(reading) = ambient.recv().await {
                if let contracts::ReadingPayload::Ambient(data) = &reading.payload {
                    tracing::debug!(sequence = reading.sequence, lux = data.lux, "ambient sample");
                }
            }
        });

        let (export_tx, export_rx) = mpsc::channel(16);
        let dispatcher: Dispatcher =
            create_dispatcher(blueprint.sinks.clone(), blueprint.storage.clone(), export_rx)
                .context("failed to create export sinks")?;
        let dispatcher_handle = dispatcher.spawn();

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let console_handle = spawn_console(event_tx);

        let mut stats = PipelineStats::default();
        let mut spectral_open = true;
        let mut ready_open = true;
        let mut ingest_done = false;
        let mut transport_failure: Option<CalibrationError> = None;

        'session: loop {
            tokio::select! {
                maybe_event = event_rx.recv() => {
                    // None means stdin closed, treat it as quit
                    let event = maybe_event.unwrap_or(CalibrationEvent::Quit);
                    let effects = calibrator.handle(event);
                    if perform_effects(effects, &control, &export_tx, &mut stats).await {
                        break 'session;
                    }
                }
                received = spectral.recv(), if spectral_open => match received {
                    Ok(reading) => {
                        let effects = calibrator.handle(CalibrationEvent::Reading(reading));
                        if perform_effects(effects, &control, &export_tx, &mut stats).await {
                            break 'session;
                        }
                    }
                    Err(_) => spectral_open = false,
                },
                ready = device_ready.recv(), if ready_open => match ready {
                    Some(()) => {
                        println!("Device ready.");
                        display_prompt();
                    }
                    None => ready_open = false,
                },
                result = &mut ingest_handle, if !ingest_done => {
                    ingest_done = true;
                    match result {
                        Ok(Ok(())) => info!("transport stream ended"),
                        Ok(Err(error)) => {
                            warn!(%error, "transport failed, ending session");
                            transport_failure = Some(error);
                            break 'session;
                        }
                        Err(join_error) => {
                            transport_failure =
                                Some(CalibrationError::transport(join_error.to_string()));
                            break 'session;
                        }
                    }
                }
            }
        }

        // Let the dispatcher drain its queues before the deadline
        drop(export_tx);
        if tokio::time::timeout(DISPATCHER_SHUTDOWN_TIMEOUT, dispatcher_handle)
            .await
            .is_err()
        {
            warn!("dispatcher did not drain in time");
        }
        if !ingest_done {
            ingest_handle.abort();
            // The quit raced the transport; a failure that already landed
            // must still reach the hosting process
            if let Ok(Err(error)) = ingest_handle.await {
                transport_failure.get_or_insert(error);
            }
        }
        ambient_drain.abort();
        console_handle.abort();

        if let Some(error) = transport_failure {
            return Err(error.into());
        }

        stats.duration = started.elapsed();
        stats.ingestion = ingest_metrics.snapshot();
        Ok(stats)
    }
}

/// Perform one batch of effects, returning true when the session ends
async fn perform_effects(
    effects: Vec<Effect>,
    control: &StreamingControl,
    export_tx: &mpsc::Sender<contracts::ExportRecord>,
    stats: &mut PipelineStats,
) -> bool {
    let mut shutdown = false;
    for effect in effects {
        match effect {
            Effect::EnableStreaming => {
                if let Err(error) = control.enable().await {
                    warn!(%error, "could not enable streaming");
                }
            }
            Effect::DisableStreaming => {
                if let Err(error) = control.disable().await {
                    warn!(%error, "could not disable streaming");
                }
            }
            Effect::StatsComplete(report) => {
                stats.windows_completed += 1;
                println!("{}", render_report(&report));
                display_prompt();
            }
            Effect::Notify(message) => {
                println!("{message}");
                display_prompt();
            }
            Effect::Export(record) => {
                stats.runs_saved += 1;
                if export_tx.send(record).await.is_err() {
                    warn!("dispatcher gone, export record lost");
                }
            }
            Effect::Shutdown => shutdown = true,
        }
    }
    shutdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{ExportRecord, StatsReport};

    fn report() -> StatsReport {
        StatsReport {
            sample_count: 3,
            wavelength_nm: 525,
            exposure_ms: 50.0,
            gain: 16.0,
            channels: Vec::new(),
        }
    }

    fn control() -> StreamingControl {
        let transport = MockTransport::synthetic(Duration::from_millis(1));
        let pipeline = IngestionPipeline::new(transport, &BackpressureConfig::default());
        let control = pipeline.control();
        pipeline.spawn();
        control
    }

    #[tokio::test]
    async fn test_export_effect_reaches_dispatcher_channel() {
        let (export_tx, mut export_rx) = mpsc::channel(4);
        let mut stats = PipelineStats::default();
        let record = ExportRecord {
            timestamp: Utc::now(),
            report: report(),
            photodiode_na: 100.0,
            quantum_efficiency: 0.5,
            raw_samples: Vec::new(),
        };

        let done =
            perform_effects(vec![Effect::Export(record)], &control(), &export_tx, &mut stats).await;

        assert!(!done);
        assert_eq!(stats.runs_saved, 1);
        assert_eq!(export_rx.recv().await.unwrap().report.wavelength_nm, 525);
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        async fn next_line(&mut self) -> Result<Option<String>, CalibrationError> {
            Err(CalibrationError::transport("serial line gone"))
        }

        async fn write_control(&mut self, _byte: u8) -> Result<(), CalibrationError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = CalibrationBlueprint::default();
        blueprint.storage.summary_csv = dir.path().join("summary.csv");
        blueprint.storage.samples_csv = dir.path().join("samples.csv");

        let pipeline = Pipeline::new(PipelineConfig {
            blueprint,
            wavelength_nm: 525,
            mock: false,
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            pipeline.run_with_transport(FailingTransport),
        )
        .await
        .expect("session must end on transport failure");

        let error = result.unwrap_err();
        assert!(error.to_string().contains("transport"), "{error}");
    }

    #[tokio::test]
    async fn test_shutdown_effect_ends_session() {
        let (export_tx, _export_rx) = mpsc::channel(4);
        let mut stats = PipelineStats::default();

        let done = perform_effects(
            vec![Effect::DisableStreaming, Effect::Shutdown],
            &control(),
            &export_tx,
            &mut stats,
        )
        .await;

        assert!(done);
        assert_eq!(stats.runs_saved, 0);
    }
}
