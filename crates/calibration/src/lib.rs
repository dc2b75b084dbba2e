//! # Calibration
//!
//! The calibration session core: a pure state machine sequencing start,
//! sampling, photodiode input, save and quit, plus the quantum efficiency
//! lookup merged into saved records.

mod qe;
mod session;

pub use qe::QeTable;
pub use session::{CalibrationPhase, Calibrator};
