//! Mock transport for tests and hardware-free runs
//!
//! Two modes: a fixed line script (tests drive exact wire input), or a
//! synthetic generator that behaves like the real device: it prints a boot
//! banner, then streams deterministic spectral frames while streaming is
//! enabled and goes quiet while it is disabled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use contracts::{
    CalibrationError, Reading, ReadingPayload, SpectralData, Transport, CHANNEL_COUNT,
    DISABLE_STREAMING, ENABLE_STREAMING,
};

use crate::decoder::DEVICE_READY_THRESHOLD;
use crate::wire;

/// Boot banner line count emitted by the synthetic generator
const BANNER_LINES: u32 = DEVICE_READY_THRESHOLD;

enum Mode {
    Script(VecDeque<String>),
    Synthetic { sequence: u64, banner_remaining: u32 },
}

/// Scripted or synthetic device stand-in
pub struct MockTransport {
    mode: Mode,
    interval: Duration,
    streaming: bool,
    controls: Arc<Mutex<Vec<u8>>>,
}

impl MockTransport {
    /// Transport that replays a fixed list of lines, then ends the stream
    pub fn scripted(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mode: Mode::Script(lines.into_iter().map(Into::into).collect()),
            interval: Duration::ZERO,
            streaming: true,
            controls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transport that emits a boot banner, then generates frames forever
    ///
    /// Starts with streaming disabled, like the real device after boot.
    pub fn synthetic(interval: Duration) -> Self {
        Self {
            mode: Mode::Synthetic {
                sequence: 0,
                banner_remaining: BANNER_LINES,
            },
            interval,
            streaming: false,
            controls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Delay between scripted lines
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Control bytes written so far, for assertions
    pub fn controls(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.controls)
    }

    /// One deterministic synthetic frame
    fn synthetic_line(sequence: u64) -> String {
        let mut channels = [0.0; CHANNEL_COUNT];
        for (i, value) in channels.iter_mut().enumerate() {
            let base = 100.0 + 25.0 * i as f64;
            let jitter = ((sequence * 37 + i as u64 * 13) % 100) as f64 / 100.0;
            *value = base + jitter;
        }
        let reading = Reading {
            sequence,
            timestamp: Utc::now(),
            payload: ReadingPayload::Spectral(SpectralData {
                millis: sequence * 100,
                exposure_ms: 166.4,
                gain: 64.0,
                temperature: 30.0 + (sequence % 10) as f64 / 10.0,
                channels,
            }),
        };
        wire::encode(&reading)
    }
}

impl Transport for MockTransport {
    async fn next_line(&mut self) -> Result<Option<String>, CalibrationError> {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
        match &mut self.mode {
            Mode::Script(lines) => Ok(lines.pop_front()),
            Mode::Synthetic {
                sequence,
                banner_remaining,
            } => {
                if *banner_remaining > 0 {
                    *banner_remaining -= 1;
                    let line = format!(
                        "AS7262 console boot [{}]",
                        BANNER_LINES - *banner_remaining
                    );
                    return Ok(Some(line));
                }
                // Quiet while streaming is disabled. The hosting select loop
                // cancels this future when a control byte needs writing.
                while !self.streaming {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                *sequence += 1;
                Ok(Some(Self::synthetic_line(*sequence)))
            }
        }
    }

    async fn write_control(&mut self, byte: u8) -> Result<(), CalibrationError> {
        match byte {
            ENABLE_STREAMING => self.streaming = true,
            DISABLE_STREAMING => self.streaming = false,
            _ => {}
        }
        self.controls
            .lock()
            .map_err(|_| CalibrationError::transport("control log poisoned"))?
            .push(byte);
        Ok(())
    }
}
