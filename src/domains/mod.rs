//! Business logic organized by bounded contexts.
//!
//! - **oauth**: OAuth 1.0a canonicalization, signing, verification
//! - **launch**: launch assembly, sourced-id codec, launch store
//! - **outcomes**: Basic Outcomes POX exchange, both directions
//! - **catalog**: in-memory platform records

pub mod catalog;
pub mod launch;
pub mod oauth;
pub mod outcomes;
