//! Calibration state machine
//!
//! Phase graph:
//!
//! ```text
//! Idle --start--> Accumulating --window full--> AwaitingSave --save--> Idle
//!   \                  |  \--start (re-arm)--/       |
//!    \---------------quit (any phase)--------------> Stopped
//! ```
//!
//! The machine is pure: [`Calibrator::handle`] consumes one event through a
//! single exhaustive match and returns the effects the hosting pipeline
//! must perform. Readings outside Accumulating are ignored; photodiode
//! input is accepted in any phase before Stopped; save enforces its two
//! preconditions without changing phase on failure.

use chrono::Utc;
use metrics::counter;
use tracing::{debug, info, warn};

use contracts::{CalibrationError, CalibrationEvent, Effect, ExportRecord, Reading, StatsReport};
use stats_engine::WindowAccumulator;

use crate::qe::QeTable;

/// Calibration session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    /// Waiting for a start command; readings are discarded
    Idle,
    /// Sampling window is filling
    Accumulating,
    /// Window complete, holding its statistics until save or restart
    AwaitingSave,
    /// Quit received; all further events are ignored
    Stopped,
}

/// The calibration session state machine
pub struct Calibrator {
    phase: CalibrationPhase,
    accumulator: WindowAccumulator,
    qe_table: QeTable,
    photodiode_na: Option<f64>,
    completed: Option<StatsReport>,
    raw_samples: Vec<Reading>,
}

impl Calibrator {
    pub fn new(sample_count: usize, wavelength_nm: u32, qe_table: QeTable) -> Self {
        Self {
            phase: CalibrationPhase::Idle,
            accumulator: WindowAccumulator::new(sample_count, wavelength_nm),
            qe_table,
            photodiode_na: None,
            completed: None,
            raw_samples: Vec::new(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Operator-supplied photodiode current, if any
    pub fn photodiode_na(&self) -> Option<f64> {
        self.photodiode_na
    }

    /// Samples absorbed by the current window
    pub fn samples_collected(&self) -> usize {
        self.accumulator.len()
    }

    /// Process one event, returning the effects to perform
    pub fn handle(&mut self, event: CalibrationEvent) -> Vec<Effect> {
        if self.phase == CalibrationPhase::Stopped {
            debug!(?event, "event after stop, ignored");
            return Vec::new();
        }

        match event {
            CalibrationEvent::Start => self.on_start(),
            CalibrationEvent::Reading(reading) => self.on_reading(reading),
            CalibrationEvent::Photodiode(current) => self.on_photodiode(current),
            CalibrationEvent::Save => self.on_save(),
            CalibrationEvent::Quit => self.on_quit(),
        }
    }

    /// Arm (or re-arm) the sampling window
    fn on_start(&mut self) -> Vec<Effect> {
        if self.phase == CalibrationPhase::Accumulating {
            info!("calibration restarted mid-window, discarding partial samples");
        } else {
            info!(
                samples = self.accumulator.capacity(),
                wavelength_nm = self.accumulator.wavelength_nm(),
                "calibration started"
            );
        }
        counter!("speccal_calibrations_started").increment(1);

        self.accumulator.clear();
        self.raw_samples.clear();
        self.completed = None;
        self.photodiode_na = None;
        self.phase = CalibrationPhase::Accumulating;

        vec![Effect::EnableStreaming]
    }

    fn on_reading(&mut self, reading: Reading) -> Vec<Effect> {
        if self.phase != CalibrationPhase::Accumulating {
            debug!(
                sequence = reading.sequence,
                phase = ?self.phase,
                "reading outside accumulation, discarded"
            );
            return Vec::new();
        }

        let Some(data) = reading.spectral().cloned() else {
            // Ambient readings do not contribute to the window
            return Vec::new();
        };

        self.raw_samples.push(reading);
        let have = self.accumulator.push(&data);
        info!(
            sample = have,
            of = self.accumulator.capacity(),
            "sample collected"
        );

        if !self.accumulator.is_full() {
            return Vec::new();
        }

        match self.accumulator.compute() {
            Ok(report) => {
                info!("sampling window complete");
                counter!("speccal_windows_completed").increment(1);
                self.completed = Some(report.clone());
                self.phase = CalibrationPhase::AwaitingSave;
                vec![Effect::DisableStreaming, Effect::StatsComplete(report)]
            }
            Err(error) => {
                // Unreachable while push and is_full stay in lock-step
                warn!(%error, "window full but statistics unavailable");
                Vec::new()
            }
        }
    }

    fn on_photodiode(&mut self, current: f64) -> Vec<Effect> {
        info!(current_na = current, "photodiode current recorded");
        self.photodiode_na = Some(current);
        vec![Effect::Notify(format!(
            "Photodiode current set to {current} nA"
        ))]
    }

    fn on_save(&mut self) -> Vec<Effect> {
        let Some(report) = self.completed.clone() else {
            let error = CalibrationError::precondition("Sorry!, no stats to save.");
            return vec![Effect::Notify(error.to_string())];
        };
        let Some(photodiode_na) = self.photodiode_na else {
            let error = CalibrationError::precondition("Enter photodiode current first!");
            return vec![Effect::Notify(error.to_string())];
        };

        let wavelength_nm = report.wavelength_nm;
        let Some(quantum_efficiency) = self.qe_table.lookup(wavelength_nm) else {
            // Recoverable: the operator may retry with another dataset
            let error = CalibrationError::QeLookup { wavelength_nm };
            warn!(%error, "save aborted");
            return vec![Effect::Notify(format!("{error}, save aborted"))];
        };

        let record = ExportRecord {
            timestamp: Utc::now(),
            report,
            photodiode_na,
            quantum_efficiency,
            raw_samples: std::mem::take(&mut self.raw_samples),
        };

        info!(
            wavelength_nm,
            photodiode_na, quantum_efficiency, "calibration run saved"
        );
        counter!("speccal_runs_saved").increment(1);

        self.completed = None;
        self.phase = CalibrationPhase::Idle;

        vec![Effect::Export(record)]
    }

    fn on_quit(&mut self) -> Vec<Effect> {
        info!("calibration session quit");
        self.phase = CalibrationPhase::Stopped;
        vec![Effect::DisableStreaming, Effect::Shutdown]
    }
}
