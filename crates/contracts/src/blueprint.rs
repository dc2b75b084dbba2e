//! CalibrationBlueprint - Config Loader output
//!
//! Describes a complete calibration session: serial device, sampling window,
//! queue behavior, storage targets, output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Serial device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Sampling window settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Classifier queue settings
    #[serde(default)]
    pub queues: QueueConfig,

    /// Storage targets
    #[serde(default)]
    pub storage: StorageConfig,

    /// Output routing configuration
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

impl Default for CalibrationBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            device: DeviceConfig::default(),
            stats: StatsConfig::default(),
            queues: QueueConfig::default(),
            storage: StorageConfig::default(),
            sinks: default_sinks(),
        }
    }
}

/// Serial device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Serial port path
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate (9600 or 115200)
    #[serde(default = "default_baud")]
    pub baud: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
        }
    }
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    115_200
}

/// Sampling window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Samples to take per channel before computing statistics
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Stimulus wavelength (nm); required before a run can start
    #[serde(default)]
    pub wavelength_nm: Option<u32>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            wavelength_nm: None,
        }
    }
}

fn default_sample_count() -> usize {
    25
}

/// Classifier queue behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Per-queue capacity
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// Overflow policy
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            drop_policy: DropPolicy::default(),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

/// Queue overflow policy; must be explicit, never silently ambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Block the producer until the consumer catches up
    #[default]
    Block,
    /// Evict the oldest queued reading to make room
    DropOldest,
}

/// Storage targets for the persistence sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Summary statistics CSV (append-only)
    #[serde(default = "default_summary_csv")]
    pub summary_csv: PathBuf,

    /// Per-sample CSV (append-only)
    #[serde(default = "default_samples_csv")]
    pub samples_csv: PathBuf,

    /// Optional quantum-efficiency table override (wavelength,qe per line)
    #[serde(default)]
    pub qe_table: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            summary_csv: default_summary_csv(),
            samples_csv: default_samples_csv(),
            qe_table: None,
        }
    }
}

fn default_summary_csv() -> PathBuf {
    PathBuf::from("speccal.csv")
}

fn default_samples_csv() -> PathBuf {
    PathBuf::from("speccal-samples.csv")
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Unique sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Worker queue capacity
    #[serde(default = "default_sink_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_sink_queue_capacity() -> usize {
    16
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Append-only CSV persistence (summary + per-sample files)
    Csv,
    /// Log-based summary sink
    Log,
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![
        SinkConfig {
            name: "csv".to_string(),
            sink_type: SinkType::Csv,
            queue_capacity: default_sink_queue_capacity(),
            params: HashMap::new(),
        },
        SinkConfig {
            name: "log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: default_sink_queue_capacity(),
            params: HashMap::new(),
        },
    ]
}
