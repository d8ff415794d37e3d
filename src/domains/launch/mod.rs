//! Launch assembly: building, signing, and correlating LTI launches.
//!
//! This domain turns platform records (tool, course, user, placement)
//! into a signed LTI 1.1 launch parameter set, and owns the sourced-id
//! codec that later correlates a grade passback with its originating
//! launch. It also provides the time-bounded store a tool provider
//! uses to keep launch data around between the launch POST and a
//! grade submission.

pub mod builder;
mod error;
pub mod sourced_id;
mod store;
mod types;

pub use builder::build_launch;
pub use error::LaunchError;
pub use sourced_id::{DecodeError, SourcedKey};
pub use store::LaunchStore;
pub use types::{LaunchContext, LaunchRequest, Principal, Role, ToolCredential};
