//! Core infrastructure: configuration, error handling, and the
//! platform HTTP host.

pub mod config;
pub mod error;
pub mod server;

pub use config::Config;
pub use error::{Error, Result};
pub use server::{LaunchLogEntry, PlatformServer};
