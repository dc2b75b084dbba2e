//! Mock Calibration Demo
//!
//! Runs one complete calibration round against the synthetic device:
//! boot banner, sampling window, photodiode input, save to CSV. No
//! serial port or operator input required.
//!
//! Run with: cargo run --bin mock_calibration

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;

use calibration::{Calibrator, QeTable};
use contracts::{CalibrationBlueprint, CalibrationEvent, Effect};
use dispatcher::create_dispatcher;
use dispatcher::format::render_report;
use ingestion::{BackpressureConfig, IngestionPipeline, MockTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init()?;

    tracing::info!("Starting mock calibration demo");

    // ==== Stage 1: Configuration ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading configuration");
        config_loader::ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        let mut blueprint = CalibrationBlueprint::default();
        blueprint.stats.sample_count = 10;
        blueprint.stats.wavelength_nm = Some(525);
        blueprint
    };
    let wavelength_nm = blueprint.stats.wavelength_nm.unwrap_or(525);

    // ==== Stage 2: Synthetic device and ingestion ====
    let mut ingest = IngestionPipeline::new(
        MockTransport::synthetic(Duration::from_millis(20)),
        &BackpressureConfig::from_blueprint(&blueprint.queues),
    );
    let spectral = ingest.spectral_receiver();
    let mut device_ready = ingest.device_ready_receiver();
    let control = ingest.control();
    let ingest_handle = ingest.spawn();

    // ==== Stage 3: Export sinks ====
    let (export_tx, export_rx) = mpsc::channel(4);
    let dispatcher = create_dispatcher(
        blueprint.sinks.clone(),
        blueprint.storage.clone(),
        export_rx,
    )?;
    let dispatcher_handle = dispatcher.spawn();

    // ==== Stage 4: Calibration session ====
    let mut calibrator = Calibrator::new(
        blueprint.stats.sample_count,
        wavelength_nm,
        QeTable::embedded()?,
    );

    device_ready.recv().await;
    tracing::info!("Device ready");

    for effect in calibrator.handle(CalibrationEvent::Start) {
        if matches!(effect, Effect::EnableStreaming) {
            control.enable().await?;
        }
    }
    calibrator.handle(CalibrationEvent::Photodiode(250.0));

    let mut saved = false;
    'session: while let Ok(reading) = spectral.recv().await {
        // Process effects in emission order so the streaming stop lands
        // before the report and the save that follow it
        let mut effects: VecDeque<Effect> =
            calibrator.handle(CalibrationEvent::Reading(reading)).into();
        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::DisableStreaming => control.disable().await?,
                Effect::StatsComplete(report) => {
                    println!("{}", render_report(&report));
                    // Window complete, save immediately
                    effects.extend(calibrator.handle(CalibrationEvent::Save));
                }
                Effect::Export(record) => {
                    export_tx.send(record).await?;
                    saved = true;
                    break 'session;
                }
                Effect::Notify(message) => println!("{message}"),
                _ => {}
            }
        }
    }

    // ==== Stage 5: Cleanup ====
    drop(export_tx);
    let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;
    ingest_handle.abort();

    if saved {
        tracing::info!(
            summary = %blueprint.storage.summary_csv.display(),
            samples = %blueprint.storage.samples_csv.display(),
            "Calibration run saved"
        );
    } else {
        tracing::warn!("Session ended without a saved run");
    }

    Ok(())
}
