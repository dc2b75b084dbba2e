//! Stats engine error types

use thiserror::Error;

/// Errors raised by the windowed statistics engine
#[derive(Debug, Error)]
pub enum StatsError {
    /// Statistics were requested before the window filled
    #[error("window not complete: {have}/{need} samples")]
    NotReady {
        /// Samples currently held
        have: usize,
        /// Window capacity
        need: usize,
    },
}
