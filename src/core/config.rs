//! Configuration management for the sandbox.
//!
//! This module provides a centralized configuration structure that can
//! be populated from environment variables or defaults. Both binaries
//! (the platform and the sample tool) read the same structure.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Main configuration structure for the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Platform host configuration.
    pub platform: PlatformConfig,

    /// Sample tool provider configuration.
    pub tool: ToolConfig,

    /// Outcomes client configuration.
    pub outcomes: OutcomesConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Platform host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Address the platform listens on.
    pub bind: String,

    /// Base URL the platform is reachable at from the tool's point of
    /// view. Advertised to tools as the outcomes service location, so
    /// it must match what the tool can actually POST to.
    pub public_base_url: String,
}

/// Sample tool provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Address the sample tool listens on.
    pub bind: String,

    /// Exact URL the tool receives launches on. Both sides sign
    /// against this string; any mismatch (proxy rewrites, container
    /// hostnames) makes every verification fail.
    pub launch_url: String,

    /// Consumer key the tool accepts.
    pub consumer_key: String,

    /// Shared secret for signing and verification.
    pub consumer_secret: String,

    /// How long stored launch data stays retrievable, in seconds.
    pub launch_ttl_secs: u64,
}

/// Custom Debug implementation to redact the secret from logs.
impl std::fmt::Debug for ToolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolConfig")
            .field("bind", &self.bind)
            .field("launch_url", &self.launch_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("launch_ttl_secs", &self.launch_ttl_secs)
            .finish()
    }
}

/// Outcomes client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomesConfig {
    /// Timeout for a grade-push HTTP call, in seconds.
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: PlatformConfig {
                bind: "127.0.0.1:8000".to_string(),
                public_base_url: "http://127.0.0.1:8000".to_string(),
            },
            tool: ToolConfig {
                bind: "127.0.0.1:8080".to_string(),
                launch_url: "http://127.0.0.1:8080/lti/launch".to_string(),
                consumer_key: "test_key".to_string(),
                consumer_secret: "test_secret".to_string(),
                launch_ttl_secs: 3600,
            },
            outcomes: OutcomesConfig { timeout_secs: 10 },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Variables are prefixed with `LTI_`, e.g. `LTI_PLATFORM_BIND`,
    /// `LTI_CONSUMER_SECRET`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(bind) = std::env::var("LTI_PLATFORM_BIND") {
            config.platform.bind = bind;
        }
        if let Ok(base_url) = std::env::var("LTI_PUBLIC_BASE_URL") {
            config.platform.public_base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(bind) = std::env::var("LTI_TOOL_BIND") {
            config.tool.bind = bind;
        }
        if let Ok(url) = std::env::var("LTI_TOOL_LAUNCH_URL") {
            config.tool.launch_url = url;
        }
        if let Ok(key) = std::env::var("LTI_CONSUMER_KEY") {
            config.tool.consumer_key = key;
        }
        if let Ok(secret) = std::env::var("LTI_CONSUMER_SECRET") {
            config.tool.consumer_secret = secret;
        } else {
            warn!("Using the default consumer secret; set LTI_CONSUMER_SECRET to override");
        }
        if let Ok(ttl) = std::env::var("LTI_LAUNCH_TTL_SECS") {
            match ttl.parse() {
                Ok(ttl) => config.tool.launch_ttl_secs = ttl,
                Err(_) => warn!("Ignoring unparsable LTI_LAUNCH_TTL_SECS={}", ttl),
            }
        }
        if let Ok(timeout) = std::env::var("LTI_OUTCOMES_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(timeout) => config.outcomes.timeout_secs = timeout,
                Err(_) => warn!("Ignoring unparsable LTI_OUTCOMES_TIMEOUT_SECS={}", timeout),
            }
        }
        if let Ok(level) = std::env::var("LTI_LOG_LEVEL") {
            config.logging.level = level;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_secret_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("LTI_CONSUMER_SECRET", "env_secret_123");
        }
        let config = Config::from_env();
        assert_eq!(config.tool.consumer_secret, "env_secret_123");
        unsafe {
            std::env::remove_var("LTI_CONSUMER_SECRET");
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("LTI_PUBLIC_BASE_URL", "http://platform.local:8000/");
        }
        let config = Config::from_env();
        assert_eq!(config.platform.public_base_url, "http://platform.local:8000");
        unsafe {
            std::env::remove_var("LTI_PUBLIC_BASE_URL");
        }
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let config = Config::default();
        let debug_str = format!("{:?}", config.tool);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("test_secret"));
    }

    #[test]
    fn test_defaults_are_local() {
        let config = Config::default();
        assert_eq!(config.platform.bind, "127.0.0.1:8000");
        assert_eq!(config.tool.launch_url, "http://127.0.0.1:8080/lti/launch");
        assert_eq!(config.outcomes.timeout_secs, 10);
    }
}
