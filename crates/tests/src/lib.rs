//! # Integration Tests
//!
//! End-to-end tests wiring the full calibration pipeline together
//! without a physical device: scripted transport into the ingestion
//! pipeline, decoded readings through the calibration state machine,
//! and saved runs out through CSV sinks.

#[cfg(test)]
mod contract_tests {
    use contracts::{CHANNEL_COUNT, CHANNEL_ORDER, TRIGGER_CHANNEL};

    #[test]
    fn test_channel_layout_is_frozen() {
        assert_eq!(CHANNEL_COUNT, 12);
        assert_eq!(CHANNEL_ORDER.len(), CHANNEL_COUNT);
        // The raw red channel closes each frame and paces the window
        assert_eq!(TRIGGER_CHANNEL, CHANNEL_ORDER[11]);
    }

    #[test]
    fn test_default_blueprint_is_valid() {
        let blueprint = contracts::CalibrationBlueprint::default();
        assert!(config_loader::ConfigLoader::validate(&blueprint).is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::Utc;
    use tokio::sync::mpsc;

    use calibration::{CalibrationPhase, Calibrator, QeTable};
    use contracts::{
        CalibrationEvent, Effect, ExportRecord, Reading, ReadingPayload, SinkConfig, SinkType,
        SpectralData, StorageConfig, CHANNEL_COUNT,
    };
    use dispatcher::create_dispatcher;
    use ingestion::{wire, BackpressureConfig, IngestionPipeline, MockTransport};

    const SAMPLE_COUNT: usize = 25;

    fn frame_line(sequence: u64) -> String {
        let mut channels = [0.0; CHANNEL_COUNT];
        for (i, value) in channels.iter_mut().enumerate() {
            *value = 10.0 + i as f64;
        }
        wire::encode(&Reading {
            sequence,
            timestamp: Utc::now(),
            payload: ReadingPayload::Spectral(SpectralData {
                millis: sequence * 100,
                exposure_ms: 166.4,
                gain: 64.0,
                temperature: 30.5,
                channels,
            }),
        })
    }

    fn storage(dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            summary_csv: dir.join("summary.csv"),
            samples_csv: dir.join("samples.csv"),
            qe_table: None,
        }
    }

    fn csv_sink_config() -> Vec<SinkConfig> {
        vec![SinkConfig {
            name: "csv".to_string(),
            sink_type: SinkType::Csv,
            queue_capacity: 16,
            params: HashMap::new(),
        }]
    }

    /// Full session: boot banner, 25 frames, photodiode mid-run, save.
    ///
    /// Covers the whole path from wire lines to an appended summary row.
    #[tokio::test]
    async fn test_full_calibration_session() {
        // Device script: boot banner then one full sampling window
        let mut script: Vec<String> = (0..6).map(|i| format!("AS7262 console boot [{i}]")).collect();
        script.extend((1..=SAMPLE_COUNT as u64).map(frame_line));

        let mut pipeline = IngestionPipeline::new(
            MockTransport::scripted(script),
            &BackpressureConfig::default(),
        );
        let spectral = pipeline.spectral_receiver();
        let mut device_ready = pipeline.device_ready_receiver();
        pipeline.spawn().await.unwrap().unwrap();

        device_ready.recv().await.unwrap();

        let mut calibrator = Calibrator::new(SAMPLE_COUNT, 525, QeTable::embedded().unwrap());
        assert!(matches!(
            calibrator.handle(CalibrationEvent::Start).as_slice(),
            [Effect::EnableStreaming]
        ));

        // Operator types the photodiode current while sampling runs
        let mut record: Option<ExportRecord> = None;
        let mut window_completed = false;
        let mut fed = 0usize;
        while let Ok(reading) = spectral.try_recv() {
            fed += 1;
            if fed == 10 {
                calibrator.handle(CalibrationEvent::Photodiode(250.0));
            }
            for effect in calibrator.handle(CalibrationEvent::Reading(reading)) {
                if let Effect::StatsComplete(report) = effect {
                    window_completed = true;
                    assert_eq!(report.sample_count, SAMPLE_COUNT);
                    // Constant input, so the mean is the input itself
                    let (channel, stats) = &report.channels[0];
                    assert_eq!(stats.mean, 10.0 + channel.index() as f64);
                    assert_eq!(stats.stddev, 0.0);
                }
            }
        }
        assert_eq!(fed, SAMPLE_COUNT);
        assert!(window_completed, "window should complete at 25 samples");
        assert_eq!(calibrator.phase(), CalibrationPhase::AwaitingSave);

        for effect in calibrator.handle(CalibrationEvent::Save) {
            if let Effect::Export(r) = effect {
                record = Some(r);
            }
        }
        let record = record.expect("save should export a record");
        assert_eq!(record.photodiode_na, 250.0);
        assert_eq!(record.raw_samples.len(), SAMPLE_COUNT);
        assert!(record.quantum_efficiency > 0.0);

        // Fan the record out to the CSV sink
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(4);
        let dispatcher = create_dispatcher(csv_sink_config(), storage(dir.path()), rx).unwrap();
        let handle = dispatcher.spawn();
        tx.send(record).await.unwrap();
        drop(tx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        let summary = std::fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2, "header plus one run");
        assert!(lines[0].starts_with("Timestamp;# Samples;Wavelength"));
        assert_eq!(lines[0].matches(';').count(), 28);
        assert!(lines[1].contains(";25;525;250;"), "row: {}", lines[1]);

        let samples = std::fs::read_to_string(dir.path().join("samples.csv")).unwrap();
        assert_eq!(samples.lines().count(), 1 + SAMPLE_COUNT);
        assert!(samples.contains(";AS7262;"));
    }

    /// The header is written once, later runs only append rows.
    #[tokio::test]
    async fn test_summary_header_written_once_across_runs() {
        let dir = tempfile::tempdir().unwrap();

        for run in 0..2u32 {
            let (tx, rx) = mpsc::channel(4);
            let dispatcher =
                create_dispatcher(csv_sink_config(), storage(dir.path()), rx).unwrap();
            let handle = dispatcher.spawn();

            let mut calibrator = Calibrator::new(3, 525, QeTable::embedded().unwrap());
            calibrator.handle(CalibrationEvent::Start);
            calibrator.handle(CalibrationEvent::Photodiode(100.0 + run as f64));
            for sequence in 1..=3u64 {
                let line = frame_line(sequence);
                let frame = wire::decode(&line).unwrap();
                let reading = Reading {
                    sequence: frame.sequence,
                    timestamp: Utc::now(),
                    payload: frame.payload,
                };
                calibrator.handle(CalibrationEvent::Reading(reading));
            }
            for effect in calibrator.handle(CalibrationEvent::Save) {
                if let Effect::Export(record) = effect {
                    tx.send(record).await.unwrap();
                }
            }
            drop(tx);
            tokio::time::timeout(Duration::from_secs(2), handle)
                .await
                .unwrap()
                .unwrap();
        }

        let summary = std::fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 3, "one header, two runs");
        assert_eq!(
            lines
                .iter()
                .filter(|l| l.starts_with("Timestamp"))
                .count(),
            1
        );
    }

    /// Save preconditions hold at the session level too.
    #[tokio::test]
    async fn test_save_preconditions_block_export() {
        let mut calibrator = Calibrator::new(3, 525, QeTable::embedded().unwrap());

        let effects = calibrator.handle(CalibrationEvent::Save);
        let [Effect::Notify(message)] = effects.as_slice() else {
            panic!("expected a notification, got {effects:?}");
        };
        assert_eq!(message, "Sorry!, no stats to save.");

        calibrator.handle(CalibrationEvent::Start);
        for sequence in 1..=3u64 {
            let line = frame_line(sequence);
            let frame = wire::decode(&line).unwrap();
            calibrator.handle(CalibrationEvent::Reading(Reading {
                sequence: frame.sequence,
                timestamp: Utc::now(),
                payload: frame.payload,
            }));
        }

        let effects = calibrator.handle(CalibrationEvent::Save);
        let [Effect::Notify(message)] = effects.as_slice() else {
            panic!("expected a notification, got {effects:?}");
        };
        assert_eq!(message, "Enter photodiode current first!");
        assert_eq!(calibrator.phase(), CalibrationPhase::AwaitingSave);
    }

    /// The synthetic device only streams frames between enable and disable.
    #[tokio::test]
    async fn test_streaming_control_gates_the_synthetic_device() {
        let pipeline = IngestionPipeline::new(
            MockTransport::synthetic(Duration::from_millis(5)),
            &BackpressureConfig::default(),
        );
        let spectral = pipeline.spectral_receiver();
        let control = pipeline.control();
        let handle = pipeline.spawn();

        // Banner only, no frames yet
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(spectral.try_recv().is_err());

        control.enable().await.unwrap();
        let reading = tokio::time::timeout(Duration::from_secs(2), spectral.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(reading.spectral().is_some());

        control.disable().await.unwrap();
        handle.abort();
    }
}
