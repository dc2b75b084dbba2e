//! Calibration events and effects
//!
//! The orchestrator consumes a single tagged-union event type through one
//! exhaustive match, instead of string-keyed callback sets. Every input the
//! state machine reacts to is a variant here; a mistyped event name cannot
//! exist.

use crate::{ExportRecord, Reading, StatsReport};

/// Input to the calibration state machine
#[derive(Debug, Clone)]
pub enum CalibrationEvent {
    /// Begin (or restart) a calibration run
    Start,

    /// A decoded sensor sample arrived
    Reading(Reading),

    /// Operator supplied the photodiode current (nanoamps).
    /// Accepted in any phase, before or after the window completes.
    Photodiode(f64),

    /// Persist the completed run
    Save,

    /// Stop accepting events and shut down
    Quit,
}

/// Side effect requested by a state transition
///
/// The state machine itself is pure: it returns the effects it wants and the
/// hosting pipeline performs them (device control, display, export dispatch).
#[derive(Debug, Clone)]
pub enum Effect {
    /// Tell the device to resume streaming
    EnableStreaming,

    /// Tell the device to stop streaming
    DisableStreaming,

    /// A sampling window completed; display its statistics
    StatsComplete(StatsReport),

    /// User-visible message (precondition failures, progress hints)
    Notify(String),

    /// Hand a completed record to the export sinks
    Export(ExportRecord),

    /// Halt event processing and stop the hosting process
    Shutdown,
}
