//! Metric registration and helpers
//!
//! All metric names used across the pipeline are described here so the
//! Prometheus endpoint carries units and help texts.

use metrics::{counter, describe_counter, describe_gauge, Unit};

/// Describe every pipeline metric
pub fn register_metrics() {
    describe_counter!(
        "speccal_readings_decoded",
        Unit::Count,
        "Wire lines successfully decoded into readings"
    );
    describe_counter!(
        "speccal_decode_errors",
        Unit::Count,
        "Wire lines discarded as undecodable"
    );
    describe_counter!(
        "speccal_device_ready",
        Unit::Count,
        "Device boot banner detections"
    );
    describe_counter!(
        "speccal_readings_dropped",
        Unit::Count,
        "Readings evicted by the drop-oldest queue policy"
    );
    describe_gauge!(
        "speccal_window_fill",
        Unit::Count,
        "Samples currently held by the statistics window"
    );
    describe_counter!(
        "speccal_calibrations_started",
        Unit::Count,
        "Calibration runs started"
    );
    describe_counter!(
        "speccal_windows_completed",
        Unit::Count,
        "Sampling windows completed"
    );
    describe_counter!("speccal_runs_saved", Unit::Count, "Calibration runs saved");
    describe_counter!(
        "speccal_console_commands",
        Unit::Count,
        "Console commands accepted"
    );
}

/// Record one accepted console command
pub fn record_console_command(command: &'static str) {
    counter!("speccal_console_commands", "command" => command).increment(1);
}
