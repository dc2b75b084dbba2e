//! StatsReport / ExportRecord - Window Accumulator and Orchestrator output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Channel, Reading};

/// Summary statistics for one channel window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Arithmetic mean, rounded to 2 decimals
    pub mean: f64,

    /// Sample standard deviation (Bessel-corrected, N-1 divisor),
    /// computed about the unrounded mean, rounded to 2 decimals
    pub stddev: f64,
}

/// Per-channel statistics for one completed sampling window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    /// Configured window size (samples per channel)
    pub sample_count: usize,

    /// Stimulus wavelength (nm) configured for this session
    pub wavelength_nm: u32,

    /// Exposure time (ms) of the last contributing reading
    pub exposure_ms: f64,

    /// Gain setting of the last contributing reading
    pub gain: f64,

    /// Statistics per channel, in canonical channel order
    pub channels: Vec<(Channel, ChannelStats)>,
}

impl StatsReport {
    /// Statistics for one named channel
    pub fn channel(&self, channel: Channel) -> Option<ChannelStats> {
        self.channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, s)| *s)
    }
}

/// Everything the persistence collaborator needs for one save
///
/// Captured by value at save time: a new calibration run may start while an
/// export of this record is still in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Save time (UTC)
    pub timestamp: DateTime<Utc>,

    /// Windowed per-channel statistics
    pub report: StatsReport,

    /// Operator-supplied photodiode current (nA)
    pub photodiode_na: f64,

    /// Quantum efficiency at the configured wavelength
    pub quantum_efficiency: f64,

    /// Full ordered sample log of the run, for per-sample export
    pub raw_samples: Vec<Reading>,
}
