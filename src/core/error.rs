//! Error types and handling for the sandbox.
//!
//! Domain modules carry their own error enums (`LaunchError`,
//! `DecodeError`, `OutcomesError`) and the HTTP handlers map those to
//! responses directly. What is left for the crate-wide error is the
//! host lifecycle: binding, serving, and the failures that should not
//! occur under normal operation.

use thiserror::Error;

/// A specialized Result type for sandbox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Host-level error type for the sandbox.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O errors from network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
