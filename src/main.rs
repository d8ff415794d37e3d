//! Platform Entry Point
//!
//! Starts the sandbox platform: seeds the demo catalog, registers the
//! configured sample tool into the first course, and serves HTTP.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use lti_sandbox::core::{Config, PlatformServer};
use lti_sandbox::domains::catalog::Catalog;
use lti_sandbox::domains::launch::ToolCredential;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting LTI sandbox platform v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(Catalog::demo());
    seed_demo_tool(&catalog, &config);

    let server = PlatformServer::new(config, catalog);
    server.run().await?;

    info!("Platform shutting down");

    Ok(())
}

/// Register the configured sample tool and place it in every demo
/// course, so the sandbox is launchable immediately.
fn seed_demo_tool(catalog: &Catalog, config: &Config) {
    let tool_id = catalog.add_tool(
        "Sample LTI Tool",
        ToolCredential {
            consumer_key: config.tool.consumer_key.clone(),
            consumer_secret: config.tool.consumer_secret.clone(),
            launch_url: config.tool.launch_url.clone(),
        },
        BTreeMap::new(),
    );
    for course in catalog.courses() {
        if let Some(placement) = catalog.place_tool(course.id, tool_id) {
            info!(
                "Placed demo tool in {} (launch via /launch/{})",
                course.code, placement.id
            );
        }
    }
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
