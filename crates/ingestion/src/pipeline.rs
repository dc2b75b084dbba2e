//! Ingestion pipeline
//!
//! Owns the transport, decoder and router, and runs them as one task:
//! lines come off the transport, decode into readings, and fan out to the
//! kind queues. Streaming control bytes are written from the same task via
//! a command channel so the transport has a single owner.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use contracts::{CalibrationError, Reading, Transport, DISABLE_STREAMING, ENABLE_STREAMING};

use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::decoder::FrameDecoder;
use crate::router::ReadingRouter;

/// Handle for issuing streaming control commands to the device
#[derive(Clone)]
pub struct StreamingControl {
    tx: mpsc::Sender<u8>,
}

impl StreamingControl {
    /// Ask the device to resume streaming
    pub async fn enable(&self) -> Result<(), CalibrationError> {
        self.send(ENABLE_STREAMING).await
    }

    /// Ask the device to stop streaming
    pub async fn disable(&self) -> Result<(), CalibrationError> {
        self.send(DISABLE_STREAMING).await
    }

    async fn send(&self, byte: u8) -> Result<(), CalibrationError> {
        self.tx
            .send(byte)
            .await
            .map_err(|_| CalibrationError::transport("ingestion pipeline is gone"))
    }
}

/// Transport + decoder + router, runnable as one task
pub struct IngestionPipeline<T: Transport> {
    transport: T,
    decoder: FrameDecoder,
    router: ReadingRouter,
    control_tx: mpsc::Sender<u8>,
    control_rx: mpsc::Receiver<u8>,
    metrics: Arc<IngestionMetrics>,
}

impl<T: Transport + Send + 'static> IngestionPipeline<T> {
    pub fn new(transport: T, config: &BackpressureConfig) -> Self {
        let metrics = Arc::new(IngestionMetrics::new());
        let decoder = FrameDecoder::new(Arc::clone(&metrics));
        let router = ReadingRouter::new(config, Arc::clone(&metrics));
        let (control_tx, control_rx) = mpsc::channel(8);
        Self {
            transport,
            decoder,
            router,
            control_tx,
            control_rx,
            metrics,
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Decoder access for registering fan-out callbacks
    pub fn decoder_mut(&mut self) -> &mut FrameDecoder {
        &mut self.decoder
    }

    /// Streaming control handle, usable after [`spawn`](Self::spawn)
    pub fn control(&self) -> StreamingControl {
        StreamingControl {
            tx: self.control_tx.clone(),
        }
    }

    /// Consumer handle for decoded spectral readings
    pub fn spectral_receiver(&self) -> async_channel::Receiver<Reading> {
        self.router.spectral_receiver()
    }

    /// Consumer handle for decoded ambient readings
    pub fn ambient_receiver(&self) -> async_channel::Receiver<Reading> {
        self.router.ambient_receiver()
    }

    /// Device-ready notifications, one per boot banner detection
    pub fn device_ready_receiver(&mut self) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.decoder.on_device_ready(Arc::new(move || {
            let _ = tx.send(());
        }));
        rx
    }

    /// Run the pipeline until the transport ends or fails
    ///
    /// Transport failures are fatal and surface through the join handle.
    pub fn spawn(mut self) -> JoinHandle<Result<(), CalibrationError>> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = self.control_rx.recv() => {
                        // self keeps a sender, so recv cannot yield None
                        if let Some(byte) = command {
                            self.transport.write_control(byte).await?;
                        }
                    }
                    line = self.transport.next_line() => match line? {
                        Some(line) => {
                            if let Some(reading) = self.decoder.feed_line(&line) {
                                if let Err(error) = self.router.route(reading).await {
                                    warn!(%error, "reading consumers gone, stopping ingestion");
                                    break;
                                }
                            }
                        }
                        None => {
                            info!("transport stream ended");
                            break;
                        }
                    },
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::wire;
    use chrono::Utc;
    use contracts::{ReadingPayload, SpectralData, CHANNEL_COUNT};

    fn frame_line(sequence: u64) -> String {
        wire::encode(&Reading {
            sequence,
            timestamp: Utc::now(),
            payload: ReadingPayload::Spectral(SpectralData {
                millis: sequence * 100,
                exposure_ms: 166.4,
                gain: 64.0,
                temperature: 30.0,
                channels: [2.5; CHANNEL_COUNT],
            }),
        })
    }

    #[tokio::test]
    async fn test_scripted_lines_flow_to_spectral_queue() {
        let script: Vec<String> = (1..=3).map(frame_line).collect();
        let pipeline =
            IngestionPipeline::new(MockTransport::scripted(script), &BackpressureConfig::default());
        let spectral = pipeline.spectral_receiver();
        let metrics = pipeline.metrics();

        pipeline.spawn().await.unwrap().unwrap();

        for expected in 1..=3 {
            assert_eq!(spectral.recv().await.unwrap().sequence, expected);
        }
        assert_eq!(metrics.snapshot().readings_decoded, 3);
    }

    #[tokio::test]
    async fn test_banner_triggers_device_ready() {
        let mut script: Vec<String> = (0..6).map(|i| format!("banner {i}")).collect();
        script.push(frame_line(1));
        let mut pipeline =
            IngestionPipeline::new(MockTransport::scripted(script), &BackpressureConfig::default());
        let mut ready = pipeline.device_ready_receiver();

        pipeline.spawn().await.unwrap().unwrap();

        ready.recv().await.unwrap();
        assert!(ready.try_recv().is_err(), "device-ready must fire once");
    }

    #[tokio::test]
    async fn test_control_handle_reaches_transport() {
        let transport = MockTransport::synthetic(std::time::Duration::from_millis(1));
        let controls = transport.controls();
        let pipeline = IngestionPipeline::new(transport, &BackpressureConfig::default());
        let control = pipeline.control();
        let handle = pipeline.spawn();

        control.enable().await.unwrap();
        control.disable().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        handle.abort();

        let written = controls.lock().unwrap().clone();
        assert!(written.contains(&b'x'));
        assert!(written.contains(&b'z'));
    }
}
