//! Ingestion error types

use thiserror::Error;

/// Errors raised inside the ingestion pipeline
#[derive(Debug, Error)]
pub enum IngestionError {
    /// A wire line could not be decoded into a reading
    #[error("failed to decode line: {message}")]
    Decode {
        /// What went wrong
        message: String,
    },

    /// A routing queue has been closed by its consumer
    #[error("reading queue '{queue}' closed")]
    QueueClosed {
        /// Queue name (spectral / ambient)
        queue: String,
    },
}

impl IngestionError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn queue_closed(queue: impl Into<String>) -> Self {
        Self::QueueClosed {
            queue: queue.into(),
        }
    }
}
