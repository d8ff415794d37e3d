//! Inbound grade handler (platform side).
//!
//! The outcomes endpoint is deliberately permissive: whatever arrives,
//! it answers with a success-shaped envelope. Tolerant consumers
//! expect that, and a sandbox gains nothing from arguing with a
//! misbehaving tool. Malformed payloads, undecodable sourced ids, and
//! unknown placements all drop the event with a `warn` log and the
//! same response shape; only a fully resolved submission produces a
//! [`GradeRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domains::launch::{sourced_id, SourcedKey};

use super::pox;

/// One received grade, as resolved from an inbound push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    /// The opaque sourced id exactly as received.
    pub sourced_id: String,
    /// Decoded course id from the sourced id.
    pub course_id: String,
    /// Decoded resource link id from the sourced id.
    pub resource_link_id: String,
    /// Decoded user id from the sourced id.
    pub user_id: String,
    /// Score as parsed from `textString`, stored as received.
    pub score: f64,
    /// The raw request envelope, kept for inspection.
    pub raw_payload: String,
    pub received_at: DateTime<Utc>,
}

/// Resolves a decoded sourced id against the platform's records.
///
/// Returning `false` means no course+resource-link association exists
/// for the triple; the submission is dropped. Persistence stays behind
/// this seam.
pub trait PlacementResolver {
    fn resolve(&self, key: &SourcedKey) -> bool;
}

impl<F> PlacementResolver for F
where
    F: Fn(&SourcedKey) -> bool,
{
    fn resolve(&self, key: &SourcedKey) -> bool {
        self(key)
    }
}

/// Handle an inbound `replaceResultRequest`.
///
/// Returns the grade record to persist (if the submission resolved)
/// and the response envelope to send back. The response always echoes
/// the inbound message id as `imsx_messageRefIdentifier` and reports
/// `imsx_codeMajor` of `success`; when no message id was readable, a
/// fresh one is generated so the response stays well-formed.
pub fn receive(raw_xml: &str, resolver: &dyn PlacementResolver) -> (Option<GradeRecord>, String) {
    let parsed = pox::parse_replace_result_request(raw_xml).unwrap_or_else(|| {
        warn!("Outcomes payload is not well-formed XML, dropping");
        pox::ReplaceResultRequest::default()
    });

    let message_id = parsed
        .message_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let response = pox::build_success_response(&message_id, "Score received");

    let Some(sid) = parsed.sourced_id else {
        warn!("Outcomes payload has no sourcedId, dropping");
        return (None, response);
    };
    let Some(score) = parsed.score_text.and_then(|t| t.parse::<f64>().ok()) else {
        warn!("Outcomes payload has no parsable score, dropping");
        return (None, response);
    };

    let key = match sourced_id::decode(&sid) {
        Ok(key) => key,
        Err(err) => {
            warn!("Sourced id did not decode ({}), dropping", err);
            return (None, response);
        }
    };

    if !resolver.resolve(&key) {
        warn!(
            "No placement for course {} / link {}, dropping",
            key.course_id, key.resource_link_id
        );
        return (None, response);
    }

    info!(
        "Grade {} received for user {} in course {}",
        score, key.user_id, key.course_id
    );
    let record = GradeRecord {
        sourced_id: sid,
        course_id: key.course_id,
        resource_link_id: key.resource_link_id,
        user_id: key.user_id,
        score,
        raw_payload: raw_xml.to_string(),
        received_at: Utc::now(),
    };
    (Some(record), response)
}

#[cfg(test)]
mod tests {
    use crate::domains::outcomes::pox::{build_replace_result_request, parse_code_major};

    use super::*;

    fn accept_all(_: &SourcedKey) -> bool {
        true
    }

    fn reject_all(_: &SourcedKey) -> bool {
        false
    }

    #[test]
    fn test_valid_submission_resolves() {
        let sid = sourced_id::encode("1", "link-1", "4");
        let xml = build_replace_result_request("msg-1", &sid, 0.85);

        let (record, response) = receive(&xml, &accept_all);
        let record = record.unwrap();
        assert_eq!(record.course_id, "1");
        assert_eq!(record.resource_link_id, "link-1");
        assert_eq!(record.user_id, "4");
        assert_eq!(record.score, 0.85);
        assert_eq!(record.sourced_id, sid);
        assert!(response.contains("<imsx_messageRefIdentifier>msg-1</imsx_messageRefIdentifier>"));
    }

    #[test]
    fn test_undecodable_sourced_id_drops_but_succeeds() {
        let xml = build_replace_result_request("msg-2", "BAD", 0.9);

        let (record, response) = receive(&xml, &accept_all);
        assert!(record.is_none());
        assert_eq!(parse_code_major(&response).as_deref(), Some("success"));
        assert!(response.contains("<imsx_messageRefIdentifier>msg-2</imsx_messageRefIdentifier>"));
    }

    #[test]
    fn test_unknown_placement_drops_but_succeeds() {
        let sid = sourced_id::encode("99", "ghost", "4");
        let xml = build_replace_result_request("msg-3", &sid, 0.5);

        let (record, response) = receive(&xml, &reject_all);
        assert!(record.is_none());
        assert_eq!(parse_code_major(&response).as_deref(), Some("success"));
    }

    #[test]
    fn test_garbage_body_still_answers_success() {
        let (record, response) = receive("definitely not xml", &accept_all);
        assert!(record.is_none());
        assert_eq!(parse_code_major(&response).as_deref(), Some("success"));
    }

    #[test]
    fn test_unparsable_score_drops() {
        let sid = sourced_id::encode("1", "link-1", "4");
        let xml = format!(
            "<imsx_POXEnvelopeRequest><imsx_POXHeader><imsx_POXRequestHeaderInfo>\
             <imsx_messageIdentifier>m</imsx_messageIdentifier>\
             </imsx_POXRequestHeaderInfo></imsx_POXHeader><imsx_POXBody>\
             <replaceResultRequest><resultRecord>\
             <sourcedGUID><sourcedId>{sid}</sourcedId></sourcedGUID>\
             <result><resultScore><textString>not-a-number</textString></resultScore></result>\
             </resultRecord></replaceResultRequest></imsx_POXBody></imsx_POXEnvelopeRequest>"
        );
        let (record, response) = receive(&xml, &accept_all);
        assert!(record.is_none());
        assert_eq!(parse_code_major(&response).as_deref(), Some("success"));
    }

    #[test]
    fn test_missing_message_id_gets_fresh_one() {
        let (record, response) = receive("<root><textString>0.5</textString></root>", &accept_all);
        assert!(record.is_none());
        // A generated UUID is echoed so the envelope stays complete.
        assert!(response.contains("<imsx_messageRefIdentifier>"));
        assert_eq!(parse_code_major(&response).as_deref(), Some("success"));
    }
}
