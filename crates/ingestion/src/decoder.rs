//! Frame Decoder
//!
//! Turns the transport's line stream into [`Reading`]s and derives the
//! device-ready signal from the boot banner.
//!
//! The device prints a multi-line text banner at boot before streaming
//! frames. None of those lines decode, so the decoder counts consecutive
//! failures: when the count reaches exactly [`DEVICE_READY_THRESHOLD`] the
//! device-ready callbacks fire, once. The counter resets only on a
//! successful decode, so a longer banner cannot re-fire the signal.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::{debug, info, warn};

use contracts::Reading;

use crate::config::IngestionMetrics;
use crate::wire;

/// Consecutive decode failures that signal the boot banner
pub const DEVICE_READY_THRESHOLD: u32 = 6;

/// Callback invoked for every decoded reading
pub type ReadingCallback = Arc<dyn Fn(&Reading) + Send + Sync>;

/// Callback invoked once when the device-ready signal fires
pub type DeviceReadyCallback = Arc<dyn Fn() + Send + Sync>;

/// Line-to-reading decoder with device-ready detection
pub struct FrameDecoder {
    consecutive_failures: u32,
    last_timestamp: Option<DateTime<Utc>>,
    reading_callbacks: Vec<ReadingCallback>,
    ready_callbacks: Vec<DeviceReadyCallback>,
    metrics: Arc<IngestionMetrics>,
}

impl FrameDecoder {
    pub fn new(metrics: Arc<IngestionMetrics>) -> Self {
        Self {
            consecutive_failures: 0,
            last_timestamp: None,
            reading_callbacks: Vec::new(),
            ready_callbacks: Vec::new(),
            metrics,
        }
    }

    /// Register a fan-out consumer for decoded readings
    pub fn on_reading(&mut self, callback: ReadingCallback) {
        self.reading_callbacks.push(callback);
    }

    /// Register a device-ready consumer
    pub fn on_device_ready(&mut self, callback: DeviceReadyCallback) {
        self.ready_callbacks.push(callback);
    }

    /// Current consecutive failure count
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Feed one line from the transport
    ///
    /// Returns the decoded reading so the caller can route it with
    /// backpressure; registered callbacks see it as well. Malformed lines
    /// are discarded and return `None`.
    pub fn feed_line(&mut self, line: &str) -> Option<Reading> {
        self.metrics.record_line();

        match wire::decode(line) {
            Ok(frame) => {
                self.consecutive_failures = 0;
                let reading = Reading {
                    sequence: frame.sequence,
                    timestamp: self.stamp(),
                    payload: frame.payload,
                };
                self.metrics.record_reading();
                counter!("speccal_readings_decoded").increment(1);
                for callback in &self.reading_callbacks {
                    callback(&reading);
                }
                Some(reading)
            }
            Err(error) => {
                self.consecutive_failures += 1;
                self.metrics.record_decode_error();
                counter!("speccal_decode_errors").increment(1);
                debug!(
                    failures = self.consecutive_failures,
                    %error,
                    line,
                    "discarded undecodable line"
                );
                if self.consecutive_failures == DEVICE_READY_THRESHOLD {
                    info!("device boot banner detected, device ready");
                    self.metrics.record_device_ready();
                    counter!("speccal_device_ready").increment(1);
                    for callback in &self.ready_callbacks {
                        callback();
                    }
                } else if self.consecutive_failures > DEVICE_READY_THRESHOLD {
                    warn!(
                        failures = self.consecutive_failures,
                        "decode failures continue past the boot banner"
                    );
                }
                None
            }
        }
    }

    /// Receipt timestamp, strictly greater than the previous one.
    ///
    /// Clock resolution can stamp two lines identically; bump by 1us so
    /// downstream ordering by timestamp is unambiguous.
    fn stamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }
}
