//! Transport trait - serial byte-stream provider abstraction
//!
//! Delivers delimited lines to the Frame Decoder and accepts the two
//! streaming control operations, each a single opaque control byte written
//! to the underlying channel. Real (serial) and mock transports implement
//! this trait for use by the ingestion pipeline.

use crate::CalibrationError;

/// Control byte instructing the device to resume streaming
pub const ENABLE_STREAMING: u8 = b'x';

/// Control byte instructing the device to stop streaming
pub const DISABLE_STREAMING: u8 = b'z';

/// Line-oriented device transport
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Next delimited line from the device, or `None` when the stream ends.
    ///
    /// # Errors
    /// Transport failures are not recoverable by the core; the hosting
    /// process decides whether to shut down.
    async fn next_line(&mut self) -> Result<Option<String>, CalibrationError>;

    /// Write one control byte to the device
    async fn write_control(&mut self, byte: u8) -> Result<(), CalibrationError>;
}
