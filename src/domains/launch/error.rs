//! Launch-specific error types.

use thiserror::Error;

/// Errors that can occur while assembling a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A required collaborator field was empty or missing.
    ///
    /// The builder fails fast instead of emitting empty wire values;
    /// a launch with a blank consumer key or user id would only fail
    /// later and further away from the cause.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl LaunchError {
    /// Create a new "missing field" error.
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }
}
