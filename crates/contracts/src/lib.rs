//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Readings carry a UTC receipt timestamp stamped by the decoder, not by the device
//! - The device `sequence` counter is informational; gaps are tolerated

mod blueprint;
mod error;
mod event;
mod reading;
mod sink;
mod stats;
mod transport;

pub use blueprint::*;
pub use error::*;
pub use event::*;
pub use reading::*;
pub use sink::*;
pub use stats::*;
pub use transport::*;
