//! # Stats Engine
//!
//! Windowed statistics over spectral readings.
//!
//! Responsibilities:
//! - Fixed-capacity per-channel sample windows ([`ChannelWindow`])
//! - Lock-step accumulation across all 12 channels ([`WindowAccumulator`])
//! - Mean and Bessel-corrected sample standard deviation per channel

mod accumulator;
mod error;
mod window;

pub use accumulator::WindowAccumulator;
pub use error::StatsError;
pub use window::ChannelWindow;
