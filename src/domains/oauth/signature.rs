//! Signature base string construction, signing, and verification.
//!
//! The base string format is fixed by OAuth 1.0a: every key and value
//! is percent-encoded with the RFC 3986 unreserved set, pairs are
//! sorted by encoded key then encoded value, and the method, URL, and
//! parameter string are joined with `&`.
//!
//! The URL that goes into the base string must be exactly the absolute
//! URL the verifying party sees, without any query string. When the
//! platform and the tool disagree about that URL (reverse proxies,
//! container networking), verification fails even though both sides
//! computed their signatures correctly. That is a deployment hazard,
//! not a bug in either implementation.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha1 = Hmac<Sha1>;

/// Name of the signature parameter, excluded from its own base string.
pub const SIGNATURE_PARAM: &str = "oauth_signature";

/// Everything except RFC 3986 unreserved characters gets escaped.
/// `+` and `/` are deliberately not exempt.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string per the OAuth 1.0a rules.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Build the OAuth 1.0a signature base string.
///
/// `url` must be the absolute request URL with no query string.
/// `params` is every request parameter except `oauth_signature`.
pub fn build_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Sign a base string with the consumer secret.
///
/// The OAuth signing key is `encode(consumer_secret) & token_secret`;
/// LTI has no token secret, so the key always ends in `&`.
pub fn sign(base_string: &str, consumer_secret: &str) -> String {
    let signing_key = format!("{}&", percent_encode(consumer_secret));

    let mut mac =
        HmacSha1::new_from_slice(signing_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(base_string.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify the signature on an inbound request.
///
/// Strips `oauth_signature` from `params`, recomputes the expected
/// signature, and compares in constant time. Timestamp freshness and
/// nonce uniqueness are out of scope here; a caller fronting a real
/// trust boundary should keep a replay window keyed by
/// `(consumer_key, nonce)` on top of this.
pub fn verify(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    claimed_signature: &str,
) -> bool {
    let unsigned: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| k != SIGNATURE_PARAM)
        .cloned()
        .collect();

    let base_string = build_base_string(method, url, &unsigned);
    let expected = sign(&base_string, consumer_secret);

    let ok = expected.as_bytes().ct_eq(claimed_signature.as_bytes());
    if !bool::from(ok) {
        warn!("OAuth signature mismatch for {} {}", method, url);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_percent_encode_unreserved_passthrough() {
        assert_eq!(percent_encode("Abc-123_~."), "Abc-123_~.");
    }

    #[test]
    fn test_percent_encode_escapes_plus_and_slash() {
        assert_eq!(percent_encode("a+b/c"), "a%2Bb%2Fc");
        assert_eq!(percent_encode("hello world"), "hello%20world");
        assert_eq!(percent_encode("key=value&"), "key%3Dvalue%26");
    }

    #[test]
    fn test_base_string_sorts_by_encoded_key() {
        let p = params(&[("b", "2"), ("a", "1")]);
        let base = build_base_string("post", "http://localhost:8080/lti/launch", &p);
        assert_eq!(
            base,
            "POST&http%3A%2F%2Flocalhost%3A8080%2Flti%2Flaunch&a%3D1%26b%3D2"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let base = "POST&http%3A%2F%2Flocalhost&a%3D1";
        assert_eq!(sign(base, "secret"), sign(base, "secret"));
        assert_ne!(sign(base, "secret"), sign(base, "other"));
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let url = "http://localhost:8080/lti/launch";
        let mut p = params(&[
            ("lti_message_type", "basic-lti-launch-request"),
            ("oauth_consumer_key", "test_key"),
            ("user_id", "4"),
        ]);
        let signature = sign(&build_base_string("POST", url, &p), "test_secret");
        p.push((SIGNATURE_PARAM.to_string(), signature.clone()));

        assert!(verify("POST", url, &p, "test_secret", &signature));
    }

    #[test]
    fn test_verify_rejects_tampered_param() {
        let url = "http://localhost:8080/lti/launch";
        let mut p = params(&[("user_id", "4"), ("roles", "Learner")]);
        let signature = sign(&build_base_string("POST", url, &p), "test_secret");
        p.push((SIGNATURE_PARAM.to_string(), signature.clone()));

        // Elevate the role after signing.
        for (k, v) in p.iter_mut() {
            if k == "roles" {
                *v = "Instructor".to_string();
            }
        }
        assert!(!verify("POST", url, &p, "test_secret", &signature));
    }

    #[test]
    fn test_verify_rejects_changed_url_or_method() {
        let url = "http://localhost:8080/lti/launch";
        let mut p = params(&[("user_id", "4")]);
        let signature = sign(&build_base_string("POST", url, &p), "test_secret");
        p.push((SIGNATURE_PARAM.to_string(), signature.clone()));

        assert!(!verify(
            "POST",
            "http://localhost:9090/lti/launch",
            &p,
            "test_secret",
            &signature
        ));
        assert!(!verify("GET", url, &p, "test_secret", &signature));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let url = "http://localhost:8080/lti/launch";
        let mut p = params(&[("user_id", "4")]);
        let signature = sign(&build_base_string("POST", url, &p), "test_secret");
        p.push((SIGNATURE_PARAM.to_string(), signature.clone()));

        assert!(!verify("POST", url, &p, "wrong_secret", &signature));
    }
}
