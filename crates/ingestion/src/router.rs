//! Reading router (channel classifier)
//!
//! Inspects each reading's kind tag and forwards it to the matching bounded
//! queue: spectral readings feed the statistics window, ambient readings
//! feed the ambient monitor. The queues are MPMC so the router can pop the
//! oldest entry itself when the drop-oldest policy applies.

use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use metrics::counter;
use tracing::warn;

use contracts::{DropPolicy, Reading, SensorKind};

use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::IngestionError;

/// Kind-tagged reading fan-in, one bounded queue per kind
pub struct ReadingRouter {
    spectral_tx: Sender<Reading>,
    spectral_rx: Receiver<Reading>,
    ambient_tx: Sender<Reading>,
    ambient_rx: Receiver<Reading>,
    policy: DropPolicy,
    metrics: Arc<IngestionMetrics>,
}

impl ReadingRouter {
    pub fn new(config: &BackpressureConfig, metrics: Arc<IngestionMetrics>) -> Self {
        let (spectral_tx, spectral_rx) = async_channel::bounded(config.channel_capacity);
        let (ambient_tx, ambient_rx) = async_channel::bounded(config.channel_capacity);
        Self {
            spectral_tx,
            spectral_rx,
            ambient_tx,
            ambient_rx,
            policy: config.drop_policy,
            metrics,
        }
    }

    /// Consumer handle for the spectral queue
    pub fn spectral_receiver(&self) -> Receiver<Reading> {
        self.spectral_rx.clone()
    }

    /// Consumer handle for the ambient queue
    pub fn ambient_receiver(&self) -> Receiver<Reading> {
        self.ambient_rx.clone()
    }

    /// Route one reading to its kind's queue
    ///
    /// # Errors
    /// Returns [`IngestionError::QueueClosed`] when the target queue's
    /// consumer side has been dropped.
    pub async fn route(&self, reading: Reading) -> Result<(), IngestionError> {
        let (queue, tx, rx) = match reading.kind() {
            SensorKind::Spectral => ("spectral", &self.spectral_tx, &self.spectral_rx),
            SensorKind::Ambient => ("ambient", &self.ambient_tx, &self.ambient_rx),
        };

        match self.policy {
            DropPolicy::Block => tx
                .send(reading)
                .await
                .map_err(|_| IngestionError::queue_closed(queue)),
            DropPolicy::DropOldest => {
                let mut reading = reading;
                loop {
                    match tx.try_send(reading) {
                        Ok(()) => return Ok(()),
                        Err(TrySendError::Full(returned)) => {
                            reading = returned;
                            // Evict the oldest queued reading to make room
                            match rx.try_recv() {
                                Ok(evicted) => {
                                    self.metrics.record_dropped();
                                    counter!("speccal_readings_dropped").increment(1);
                                    warn!(
                                        queue,
                                        sequence = evicted.sequence,
                                        "queue full, dropped oldest reading"
                                    );
                                }
                                // Consumer raced us and made room; retry the send
                                Err(async_channel::TryRecvError::Empty) => {}
                                Err(async_channel::TryRecvError::Closed) => {
                                    return Err(IngestionError::queue_closed(queue));
                                }
                            }
                        }
                        Err(TrySendError::Closed(_)) => {
                            return Err(IngestionError::queue_closed(queue));
                        }
                    }
                }
            }
        }
    }
}
