//! OAuth 1.0a request signing for LTI 1.1.
//!
//! LTI 1.1 proves launch integrity with an HMAC-SHA1 signature over a
//! canonical rendering of the request. This domain owns the three
//! pieces of that scheme:
//!
//! - building the signature base string (canonicalization)
//! - deriving the signature from the consumer secret
//! - verifying an inbound signature in constant time

mod signature;

pub use signature::{build_base_string, percent_encode, sign, verify, SIGNATURE_PARAM};
