//! Window accumulator
//!
//! Twelve channel windows filled in lock-step, one value per channel per
//! spectral reading. Because every window receives exactly one value per
//! reading, the designated trigger channel reaching capacity means all of
//! them have; window-full is checked there and nowhere else.

use metrics::gauge;
use tracing::debug;

use contracts::{ChannelStats, SpectralData, StatsReport, CHANNEL_COUNT, CHANNEL_ORDER, TRIGGER_CHANNEL};

use crate::error::StatsError;
use crate::window::ChannelWindow;

/// Round to 2 decimals, the report precision
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Lock-step channel windows for one calibration run
pub struct WindowAccumulator {
    windows: [ChannelWindow; CHANNEL_COUNT],
    capacity: usize,
    wavelength_nm: u32,
    last_exposure_ms: f64,
    last_gain: f64,
}

impl WindowAccumulator {
    /// Create an accumulator of `capacity` samples per channel
    pub fn new(capacity: usize, wavelength_nm: u32) -> Self {
        Self {
            windows: std::array::from_fn(|_| ChannelWindow::new(capacity)),
            capacity,
            wavelength_nm,
            last_exposure_ms: 0.0,
            last_gain: 0.0,
        }
    }

    /// Absorb one spectral reading, returning the fill level
    pub fn push(&mut self, data: &SpectralData) -> usize {
        for (window, value) in self.windows.iter_mut().zip(data.channels) {
            window.push(value);
        }
        self.last_exposure_ms = data.exposure_ms;
        self.last_gain = data.gain;

        let have = self.len();
        gauge!("speccal_window_fill").set(have as f64);
        debug!(have, need = self.capacity, "window sample absorbed");
        have
    }

    /// Samples currently held (all windows fill in lock-step)
    pub fn len(&self) -> usize {
        self.trigger_window().len()
    }

    /// Whether the accumulator holds no samples
    pub fn is_empty(&self) -> bool {
        self.trigger_window().is_empty()
    }

    /// Configured samples per channel
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stimulus wavelength this accumulator was armed with
    pub fn wavelength_nm(&self) -> u32 {
        self.wavelength_nm
    }

    /// Whether the sampling window has completed
    pub fn is_full(&self) -> bool {
        self.trigger_window().is_full()
    }

    /// Discard all held samples, keeping the configuration
    pub fn clear(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
        gauge!("speccal_window_fill").set(0.0);
    }

    /// Per-channel statistics for the completed window
    ///
    /// # Errors
    /// Returns [`StatsError::NotReady`] until the window is full.
    pub fn compute(&self) -> Result<StatsReport, StatsError> {
        if !self.is_full() {
            return Err(StatsError::NotReady {
                have: self.len(),
                need: self.capacity,
            });
        }

        let channels = CHANNEL_ORDER
            .iter()
            .zip(&self.windows)
            .map(|(channel, window)| {
                // is_full guarantees >= 2 samples (capacity is validated >= 2)
                let mean = window.mean().unwrap_or(0.0);
                let stddev = window.sample_stddev().unwrap_or(0.0);
                (
                    *channel,
                    ChannelStats {
                        mean: round2(mean),
                        stddev: round2(stddev),
                    },
                )
            })
            .collect();

        Ok(StatsReport {
            sample_count: self.capacity,
            wavelength_nm: self.wavelength_nm,
            exposure_ms: self.last_exposure_ms,
            gain: self.last_gain,
            channels,
        })
    }

    fn trigger_window(&self) -> &ChannelWindow {
        &self.windows[TRIGGER_CHANNEL.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Band, Channel};

    fn sample(base: f64) -> SpectralData {
        let mut channels = [0.0; CHANNEL_COUNT];
        for (i, value) in channels.iter_mut().enumerate() {
            *value = base + i as f64 * 10.0;
        }
        SpectralData {
            millis: 100,
            exposure_ms: 166.4,
            gain: 64.0,
            temperature: 30.0,
            channels,
        }
    }

    #[test]
    fn test_fills_in_lock_step() {
        let mut acc = WindowAccumulator::new(3, 525);
        assert!(acc.is_empty());

        assert_eq!(acc.push(&sample(1.0)), 1);
        assert_eq!(acc.push(&sample(2.0)), 2);
        assert!(!acc.is_full());
        assert_eq!(acc.push(&sample(3.0)), 3);
        assert!(acc.is_full());
    }

    #[test]
    fn test_compute_before_full_is_not_ready() {
        let mut acc = WindowAccumulator::new(4, 525);
        acc.push(&sample(1.0));
        let err = acc.compute().unwrap_err();
        assert!(matches!(err, StatsError::NotReady { have: 1, need: 4 }));
    }

    #[test]
    fn test_known_statistics() {
        let mut acc = WindowAccumulator::new(5, 525);
        for v in 1..=5 {
            acc.push(&sample(f64::from(v)));
        }

        let report = acc.compute().unwrap();
        assert_eq!(report.sample_count, 5);
        assert_eq!(report.wavelength_nm, 525);
        assert_eq!(report.exposure_ms, 166.4);
        assert_eq!(report.gain, 64.0);

        // First channel sees 1..5: mean 3.00, sample stddev 1.58
        let first = report.channel(CHANNEL_ORDER[0]).unwrap();
        assert_eq!(first.mean, 3.0);
        assert_eq!(first.stddev, 1.58);

        // Every channel sees the same spread, offset by its base
        let blue = report
            .channel(Channel {
                band: Band::Blue,
                raw: false,
            })
            .unwrap();
        assert_eq!(blue.mean, 23.0);
        assert_eq!(blue.stddev, 1.58);
    }

    #[test]
    fn test_overflow_keeps_newest_window() {
        let mut acc = WindowAccumulator::new(3, 525);
        for v in 1..=5 {
            acc.push(&sample(f64::from(v)));
        }
        assert!(acc.is_full());

        // Window holds 3, 4, 5: mean 4.00
        let report = acc.compute().unwrap();
        assert_eq!(report.channel(CHANNEL_ORDER[0]).unwrap().mean, 4.0);
    }

    #[test]
    fn test_clear_rearms_the_window() {
        let mut acc = WindowAccumulator::new(2, 525);
        acc.push(&sample(1.0));
        acc.push(&sample(2.0));
        assert!(acc.is_full());

        acc.clear();
        assert!(acc.is_empty());
        assert!(acc.compute().is_err());
    }

    #[test]
    fn test_report_lists_channels_in_canonical_order() {
        let mut acc = WindowAccumulator::new(2, 525);
        acc.push(&sample(1.0));
        acc.push(&sample(2.0));

        let report = acc.compute().unwrap();
        let order: Vec<_> = report.channels.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, CHANNEL_ORDER.to_vec());
    }
}
