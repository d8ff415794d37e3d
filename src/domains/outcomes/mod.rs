//! Basic Outcomes (grade passback) exchange.
//!
//! Outcomes is a POX (plain-old-XML) request/response exchange: the
//! tool POSTs a `replaceResultRequest` envelope to the platform's
//! outcomes URL, and the platform answers with a response envelope.
//! This domain owns the envelope codec, the client side (tool pushing
//! a grade), and the server side (platform receiving one).

mod client;
mod error;
mod handler;
pub mod pox;

pub use client::{OutcomesClient, PushOutcome};
pub use error::OutcomesError;
pub use handler::{receive, GradeRecord, PlacementResolver};
