//! Outcomes-specific error types.

use thiserror::Error;

/// Errors from the grade-push client.
///
/// None of these are retried automatically; a failed push is surfaced
/// to the caller with enough raw material to diagnose it.
#[derive(Debug, Error)]
pub enum OutcomesError {
    /// The score is outside the valid LTI range.
    #[error("Score {0} is outside the range 0.0..=1.0")]
    InvalidScore(f64),

    /// The HTTP request itself failed (connect, timeout, DNS).
    #[error("Outcomes request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The platform answered, but not with a success envelope.
    /// Carries the raw response body for diagnostics.
    #[error("Platform rejected grade push (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

impl OutcomesError {
    /// Create a new "rejected" error from a response.
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }
}
