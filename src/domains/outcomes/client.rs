//! Grade-push client (tool → platform).

use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use super::{pox, OutcomesError};

/// Receipt for a grade push the platform accepted.
#[derive(Debug, Clone)]
pub struct PushOutcome {
    /// Message id generated for this push.
    pub message_id: String,
    /// Raw response envelope, kept for inspection.
    pub raw_response: String,
}

/// HTTP client for the Basic Outcomes service.
///
/// The platform names the target URL per launch via
/// `lis_outcome_service_url`; this client just POSTs where it is told.
/// Pushes are never retried here: the caller decides whether a retry
/// is appropriate, knowing that each delivery appends a new grade
/// record on the platform side.
#[derive(Debug, Clone)]
pub struct OutcomesClient {
    http: reqwest::Client,
}

impl OutcomesClient {
    /// Create a client whose requests time out after `timeout`.
    ///
    /// A slow grade target must not be able to stall the host forever,
    /// so the timeout is mandatory.
    pub fn new(timeout: Duration) -> Result<Self, OutcomesError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Push a grade to the platform's outcomes URL.
    ///
    /// Success requires HTTP 200 and a structurally parsed
    /// `imsx_codeMajor` of `success` in the response envelope. Any
    /// other answer comes back as [`OutcomesError::Rejected`] with the
    /// raw body; transport failures as [`OutcomesError::Network`].
    pub async fn push_grade(
        &self,
        outcomes_url: &str,
        sourced_id: &str,
        score: f64,
    ) -> Result<PushOutcome, OutcomesError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(OutcomesError::InvalidScore(score));
        }

        let message_id = Uuid::new_v4().to_string();
        let payload = pox::build_replace_result_request(&message_id, sourced_id, score);
        debug!("Pushing grade {} to {}", score, outcomes_url);

        let response = self
            .http
            .post(outcomes_url)
            .header("Content-Type", "application/xml")
            .body(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if status != 200 {
            return Err(OutcomesError::rejected(status, body));
        }
        match pox::parse_code_major(&body).as_deref() {
            Some("success") => {
                info!("Grade push accepted (message id {})", message_id);
                Ok(PushOutcome {
                    message_id,
                    raw_response: body,
                })
            }
            _ => Err(OutcomesError::rejected(status, body)),
        }
    }
}
