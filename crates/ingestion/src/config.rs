//! Queue configuration and ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

pub use contracts::DropPolicy;

/// Routing queue configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Per-kind queue capacity
    pub channel_capacity: usize,

    /// Drop policy when a queue is full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            drop_policy: DropPolicy::Block,
        }
    }
}

impl BackpressureConfig {
    /// Create new queue configuration
    pub fn new(channel_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            channel_capacity,
            drop_policy,
        }
    }

    /// Build from the blueprint's queue section
    pub fn from_blueprint(queues: &contracts::QueueConfig) -> Self {
        Self {
            channel_capacity: queues.capacity,
            drop_policy: queues.drop_policy,
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total wire lines received
    pub lines_received: AtomicU64,

    /// Lines that failed to decode
    pub decode_errors: AtomicU64,

    /// Successfully decoded readings
    pub readings_decoded: AtomicU64,

    /// Device-ready signals fired
    pub device_ready_signals: AtomicU64,

    /// Readings evicted by the drop-oldest policy
    pub readings_dropped: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received line
    pub fn record_line(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decode failure
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decoded reading
    pub fn record_reading(&self) {
        self.readings_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a device-ready signal
    pub fn record_device_ready(&self) {
        self.device_ready_signals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reading evicted by drop-oldest
    pub fn record_dropped(&self) {
        self.readings_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            readings_decoded: self.readings_decoded.load(Ordering::Relaxed),
            device_ready_signals: self.device_ready_signals.load(Ordering::Relaxed),
            readings_dropped: self.readings_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Total wire lines received
    pub lines_received: u64,

    /// Lines that failed to decode
    pub decode_errors: u64,

    /// Successfully decoded readings
    pub readings_decoded: u64,

    /// Device-ready signals fired
    pub device_ready_signals: u64,

    /// Readings evicted by the drop-oldest policy
    pub readings_dropped: u64,
}
