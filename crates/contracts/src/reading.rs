//! Reading - Frame Decoder output
//!
//! One decoded sample from the serial device. Two device types share the
//! wire format: the six-band spectral sensor and the ambient light sensor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spectral band of the six-channel sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Violet,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

impl Band {
    /// All bands in canonical (wire) order
    pub const ALL: [Band; 6] = [
        Band::Violet,
        Band::Blue,
        Band::Green,
        Band::Yellow,
        Band::Orange,
        Band::Red,
    ];

    /// Lowercase band name as it appears in the wire documentation
    pub fn label(self) -> &'static str {
        match self {
            Band::Violet => "violet",
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Yellow => "yellow",
            Band::Orange => "orange",
            Band::Red => "red",
        }
    }

    /// Capitalized band name for report columns
    pub fn display_name(self) -> &'static str {
        match self {
            Band::Violet => "Violet",
            Band::Blue => "Blue",
            Band::Green => "Green",
            Band::Yellow => "Yellow",
            Band::Orange => "Orange",
            Band::Red => "Red",
        }
    }
}

/// One of the 12 named channels: each band has a calibrated and a raw variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub band: Band,
    pub raw: bool,
}

/// Number of channels carried by a spectral reading
pub const CHANNEL_COUNT: usize = 12;

/// Canonical channel order, matching the positional wire layout:
/// calibrated then raw, band by band.
pub const CHANNEL_ORDER: [Channel; CHANNEL_COUNT] = {
    const fn cal(band: Band) -> Channel {
        Channel { band, raw: false }
    }
    const fn raw(band: Band) -> Channel {
        Channel { band, raw: true }
    }
    [
        cal(Band::Violet),
        raw(Band::Violet),
        cal(Band::Blue),
        raw(Band::Blue),
        cal(Band::Green),
        raw(Band::Green),
        cal(Band::Yellow),
        raw(Band::Yellow),
        cal(Band::Orange),
        raw(Band::Orange),
        cal(Band::Red),
        raw(Band::Red),
    ]
};

/// The designated window-full trigger channel: last in canonical order.
///
/// All channels fill in lock-step (one value per channel per reading), so
/// the last channel reaching capacity means every channel has.
pub const TRIGGER_CHANNEL: Channel = CHANNEL_ORDER[CHANNEL_COUNT - 1];

impl Channel {
    /// Wire/CSV name, e.g. `violet` or `raw_violet`
    pub fn name(self) -> &'static str {
        match (self.band, self.raw) {
            (Band::Violet, false) => "violet",
            (Band::Violet, true) => "raw_violet",
            (Band::Blue, false) => "blue",
            (Band::Blue, true) => "raw_blue",
            (Band::Green, false) => "green",
            (Band::Green, true) => "raw_green",
            (Band::Yellow, false) => "yellow",
            (Band::Yellow, true) => "raw_yellow",
            (Band::Orange, false) => "orange",
            (Band::Orange, true) => "raw_orange",
            (Band::Red, false) => "red",
            (Band::Red, true) => "raw_red",
        }
    }

    /// Position in [`CHANNEL_ORDER`]
    pub fn index(self) -> usize {
        let band_idx = self.band as usize;
        band_idx * 2 + usize::from(self.raw)
    }
}

/// Sensor kind tag, declared by the first wire field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Six-band spectral sensor
    Spectral,
    /// Ambient light (lux) sensor
    Ambient,
}

/// One decoded sample
///
/// Created once per successfully parsed line, immutable afterwards.
/// Ownership passes downstream by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Device-side monotonically increasing counter (gaps tolerated)
    pub sequence: u64,

    /// Receipt time assigned by the decoder, not the device
    pub timestamp: DateTime<Utc>,

    /// Kind-specific telemetry
    pub payload: ReadingPayload,
}

/// Kind-specific reading payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReadingPayload {
    /// Spectral sensor sample: telemetry plus the 12 channel intensities
    Spectral(SpectralData),

    /// Ambient light sample
    Ambient(AmbientData),
}

/// Spectral sensor telemetry and channel intensities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralData {
    /// Device uptime milliseconds
    pub millis: u64,

    /// Exposure time (ms)
    pub exposure_ms: f64,

    /// Analog gain setting
    pub gain: f64,

    /// Die temperature (degrees C)
    pub temperature: f64,

    /// Channel intensities in [`CHANNEL_ORDER`]
    pub channels: [f64; CHANNEL_COUNT],
}

impl SpectralData {
    /// Intensity of one named channel
    pub fn channel(&self, channel: Channel) -> f64 {
        self.channels[channel.index()]
    }
}

/// Ambient light sensor telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientData {
    /// Device uptime milliseconds
    pub millis: u64,

    /// Exposure time (ms)
    pub exposure_ms: f64,

    /// Illuminance (lux)
    pub lux: f64,
}

impl Reading {
    /// Kind tag of this reading
    pub fn kind(&self) -> SensorKind {
        match self.payload {
            ReadingPayload::Spectral(_) => SensorKind::Spectral,
            ReadingPayload::Ambient(_) => SensorKind::Ambient,
        }
    }

    /// Spectral payload, if this is a spectral reading
    pub fn spectral(&self) -> Option<&SpectralData> {
        match &self.payload {
            ReadingPayload::Spectral(data) => Some(data),
            ReadingPayload::Ambient(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order_indices() {
        for (i, channel) in CHANNEL_ORDER.iter().enumerate() {
            assert_eq!(channel.index(), i, "channel {} out of place", channel.name());
        }
    }

    #[test]
    fn test_trigger_is_raw_red() {
        assert_eq!(TRIGGER_CHANNEL.band, Band::Red);
        assert!(TRIGGER_CHANNEL.raw);
        assert_eq!(TRIGGER_CHANNEL.name(), "raw_red");
    }

    #[test]
    fn test_channel_names_unique() {
        let names: std::collections::HashSet<_> =
            CHANNEL_ORDER.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), CHANNEL_COUNT);
    }
}
