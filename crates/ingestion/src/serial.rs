//! Serial device transport
//!
//! Wraps a tokio-serial stream as a line-oriented [`Transport`]. The read
//! half feeds a buffered line splitter; the write half carries the
//! single-byte streaming control commands.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, ReadHalf, WriteHalf};
use tokio_serial::SerialStream;
use tracing::info;

use contracts::{CalibrationError, Transport};

/// Line-oriented serial port transport
pub struct SerialTransport {
    lines: Lines<BufReader<ReadHalf<SerialStream>>>,
    writer: WriteHalf<SerialStream>,
}

impl SerialTransport {
    /// Open a serial port in raw 8N1 mode at the given baud rate
    ///
    /// # Errors
    /// Returns [`CalibrationError::Transport`] when the port cannot be
    /// opened.
    pub fn open(port: &str, baud: u32) -> Result<Self, CalibrationError> {
        let builder = tokio_serial::new(port, baud);
        let stream = SerialStream::open(&builder)
            .map_err(|e| CalibrationError::transport(format!("cannot open {port}: {e}")))?;
        info!(port, baud, "serial port open");

        let (reader, writer) = tokio::io::split(stream);
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }
}

impl Transport for SerialTransport {
    async fn next_line(&mut self) -> Result<Option<String>, CalibrationError> {
        self.lines
            .next_line()
            .await
            .map_err(|e| CalibrationError::transport(format!("serial read failed: {e}")))
    }

    async fn write_control(&mut self, byte: u8) -> Result<(), CalibrationError> {
        self.writer
            .write_all(&[byte])
            .await
            .map_err(|e| CalibrationError::transport(format!("serial write failed: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| CalibrationError::transport(format!("serial flush failed: {e}")))
    }
}
