//! Sourced-id codec.
//!
//! A sourced id is the only correlation key between a grade passback
//! and the launch it belongs to. It is a reversible encoding of the
//! `(course, resource link, user)` triple: the three ids joined with
//! `:` and base64-encoded.
//!
//! The scheme leaks those ids to anyone who can read an outcomes
//! payload. That is acceptable for a localhost sandbox; anything with
//! a real trust boundary should hand out an unguessable per-launch
//! token and treat it as a pure lookup key instead.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// The decoded correlation triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedKey {
    pub course_id: String,
    pub resource_link_id: String,
    pub user_id: String,
}

/// Errors from decoding an externally supplied sourced id.
///
/// Decoding failure is a non-fatal "no correlation found" at every
/// call site; the payload came from outside and may be arbitrary.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid base64.
    #[error("Sourced id is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not UTF-8.
    #[error("Sourced id payload is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The payload did not split into exactly three `:` fields.
    #[error("Sourced id has {0} fields, expected 3")]
    Shape(usize),
}

/// Encode a correlation triple into an opaque sourced id.
pub fn encode(course_id: &str, resource_link_id: &str, user_id: &str) -> String {
    BASE64.encode(format!("{course_id}:{resource_link_id}:{user_id}"))
}

/// Decode a sourced id back into its correlation triple.
pub fn decode(sourced_id: &str) -> Result<SourcedKey, DecodeError> {
    let raw = String::from_utf8(BASE64.decode(sourced_id)?)?;
    let fields: Vec<&str> = raw.split(':').collect();
    if fields.len() != 3 {
        return Err(DecodeError::Shape(fields.len()));
    }
    Ok(SourcedKey {
        course_id: fields[0].to_string(),
        resource_link_id: fields[1].to_string(),
        user_id: fields[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        // base64 of the literal "7:abc-123:42"
        assert_eq!(encode("7", "abc-123", "42"), "NzphYmMtMTIzOjQy");
    }

    #[test]
    fn test_round_trip() {
        let id = encode("7", "abc-123", "42");
        let key = decode(&id).unwrap();
        assert_eq!(key.course_id, "7");
        assert_eq!(key.resource_link_id, "abc-123");
        assert_eq!(key.user_id, "42");
    }

    #[test]
    fn test_round_trip_uuid_link() {
        let link = "c2f1a0de-6b1f-47f5-9c36-0a6d5a3d9b01";
        let key = decode(&encode("12", link, "3")).unwrap();
        assert_eq!(key.resource_link_id, link);
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode("not-valid-base64!!"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        let two = BASE64.encode("a:b");
        assert!(matches!(decode(&two), Err(DecodeError::Shape(2))));

        let four = BASE64.encode("a:b:c:d");
        assert!(matches!(decode(&four), Err(DecodeError::Shape(4))));
    }

    #[test]
    fn test_decode_rejects_non_utf8() {
        let bad = BASE64.encode([0xff, 0xfe, 0x3a, 0x41, 0x3a, 0x42]);
        assert!(matches!(decode(&bad), Err(DecodeError::Utf8(_))));
    }
}
