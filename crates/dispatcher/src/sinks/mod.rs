//! Built-in export sinks

mod csv;
mod log;

pub use self::csv::CsvSink;
pub use self::log::LogSink;
