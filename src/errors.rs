//! Crate-wide error types.
//!
//! Error classes:
//! - `Configuration`: raised synchronously at record construction; never retried
//! - `Connection`: backend unreachable at adapter construction; no fallback
//! - `Validation`: schema violation at save time; the save is aborted
//! - `NotSupported`: enumeration requested from a backend that cannot provide it
//!
//! Absence of a stored document is never an error; `load` returns `Ok(None)`.

use thiserror::Error;

use crate::schema::ValidationError;

/// Result type for clara operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the record engine and its backends
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid record declaration or backend selection
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Backend unreachable when the adapter was constructed
    #[error("connection error: {0}")]
    Connection(String),

    /// Document rejected by the bound schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Key enumeration requested from a backend that cannot support it
    #[error("key enumeration is not supported by the {0} backend")]
    NotSupported(&'static str),

    /// Disk failure in the file-backed adapter
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}
