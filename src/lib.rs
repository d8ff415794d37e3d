//! LTI 1.1 Sandbox Library
//!
//! A local sandbox for exercising the LTI 1.1 interoperability
//! protocol between a platform (which launches tools) and a tool
//! provider (which receives launches and pushes grades back).
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, and the platform host
//! - **domains**: Protocol logic organized by bounded contexts
//!   - **oauth**: OAuth 1.0a request signing and verification
//!   - **launch**: Launch parameter assembly and the sourced-id codec
//!   - **outcomes**: Basic Outcomes (grade passback) exchange
//!   - **catalog**: In-memory platform records
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lti_sandbox::{core::{Config, PlatformServer}, domains::catalog::Catalog};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = PlatformServer::new(config, Arc::new(Catalog::demo()));
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, PlatformServer, Result};
