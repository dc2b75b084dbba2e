//! # Dispatcher
//!
//! Export fan-out for saved calibration runs.
//!
//! Responsibilities:
//! - Formatting: fixed-order summary rows and console band tables ([`format`])
//! - Sinks: append-only CSV files and a tracing log sink ([`sinks`])
//! - One worker task per sink with an isolated queue ([`SinkHandle`])
//! - Fan-out loop consuming [`contracts::ExportRecord`]s ([`Dispatcher`])

mod dispatcher;
mod error;
pub mod format;
mod handle;
mod metrics;
pub mod sinks;

pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
