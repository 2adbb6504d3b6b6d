//! Error types for the ISAC presence-sensing system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete CSI data; fatal for the whole batch.
    #[error("Invalid CSI frame {timestamp}: {reason}")]
    InvalidFrame { timestamp: String, reason: String },

    /// The classifier produced a value outside [0, 1].
    #[error("Classifier returned invalid probability {0}")]
    InvalidProbability(f64),

    #[error("Mean uncertainty out of range [0, 100]: {0}")]
    InvalidUncertainty(f64),

    /// The frame source could not supply data. Retryable by the transport.
    #[error("Frame source unavailable: {0}")]
    Unavailable(String),

    #[error("Empty batch: no frames to decide on")]
    EmptyBatch,

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn invalid_frame(timestamp: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidFrame {
            timestamp: timestamp.into(),
            reason: reason.into(),
        }
    }

    /// Only an unavailable frame source is worth retrying upstream.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}
