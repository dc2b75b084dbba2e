//! # Ingestion
//!
//! Device-facing half of the calibration pipeline.
//!
//! Responsibilities:
//! - Wire codec for the positional line format ([`wire`])
//! - Frame decoding with device-ready detection ([`FrameDecoder`])
//! - Kind-based routing into bounded queues ([`ReadingRouter`])
//! - Transports: real serial port and a scripted/synthetic mock
//!
//! The usual entry point is [`IngestionPipeline`], which wires the three
//! stages together and runs them as a single task.

mod config;
mod decoder;
mod error;
mod mock;
mod pipeline;
mod router;
#[cfg(feature = "serial")]
mod serial;
pub mod wire;

pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use decoder::{DeviceReadyCallback, FrameDecoder, ReadingCallback, DEVICE_READY_THRESHOLD};
pub use error::IngestionError;
pub use mock::MockTransport;
pub use pipeline::{IngestionPipeline, StreamingControl};
pub use router::ReadingRouter;
#[cfg(feature = "serial")]
pub use serial::SerialTransport;
