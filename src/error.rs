//! Error types for the checking collaborators.
//!
//! These never cross the engine's check/learn contract: the engine logs them
//! and degrades to an empty or local-only result instead.

use thiserror::Error;

/// Failure talking to the remote grammar/spelling service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Service returned status {0}")]
    Status(u16),

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Failure reading or writing learned words
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned status {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
