//! Error types for the trainer

use thiserror::Error;

/// Every error in this crate is a logic defect or a broken input file, so none
/// of them is retried. They propagate up to the binary, which aborts the run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to deserialize value table from {origin}: {message}")]
    Deserialization { origin: String, message: String },

    #[error("failed to serialize value table: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("rules engine error: {message}")]
    RulesEngine { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn rules(message: impl Into<String>) -> Self {
        Error::RulesEngine {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
