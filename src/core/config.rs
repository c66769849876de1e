//! Configuration management for the tool host.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (and a `.env` file) or defaults.

use super::transport::HttpConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the tool host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP listener configuration.
    pub transport: HttpConfig,

    /// Per-registry session manager configuration.
    pub sessions: SessionsConfig,

    /// Which registries to mount.
    pub registries: RegistriesConfig,

    /// Web search configuration.
    pub search: SearchConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported in the index page.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Session manager settings applied to every registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Maximum concurrent requests per registry.
    pub max_sessions: u32,

    /// How long stopping a registry waits for in-flight requests.
    pub drain_timeout_secs: u64,
}

impl SessionsConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// Registries mounted at startup, in mount order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistriesConfig {
    pub enabled: Vec<String>,
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API endpoint.
    pub endpoint: String,

    /// Number of results requested per query.
    pub max_results: u32,

    /// Answer with an empty list instead of an error when search fails.
    pub fallback_on_error: bool,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Tavily API key for web search.
    pub tavily_api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "tavily_api_key",
                &self.tavily_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` and `MCP_LOG_TIMESTAMPS`.
    ///
    /// Usable before the subscriber is installed, so the rest of the
    /// configuration can be loaded with logging active.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("MCP_LOG_LEVEL").unwrap_or(defaults.level),
            with_timestamps: env_flag("MCP_LOG_TIMESTAMPS", defaults.with_timestamps),
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1024,
            drain_timeout_secs: 10,
        }
    }
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["echo".to_string(), "math".to_string(), "physrisk".to_string()],
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::domains::tools::definitions::search::tavily::DEFAULT_ENDPOINT
                .to_string(),
            max_results: 5,
            fallback_on_error: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "tool-host".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            transport: HttpConfig::default(),
            sessions: SessionsConfig::default(),
            registries: RegistriesConfig::default(),
            search: SearchConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

/// Read and parse an environment variable, keeping `default` when it is
/// unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a boolean flag leniently ("1", "true", "yes", "on").
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("Ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();

        config.transport = HttpConfig::from_env();

        config.sessions.max_sessions = env_or("MCP_MAX_SESSIONS", config.sessions.max_sessions);
        config.sessions.drain_timeout_secs =
            env_or("MCP_SESSION_DRAIN_SECS", config.sessions.drain_timeout_secs);

        if let Ok(registries) = std::env::var("MCP_REGISTRIES") {
            config.registries.enabled = registries
                .split(',')
                .map(|r| r.trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect();
        }

        if let Ok(endpoint) = std::env::var("MCP_TAVILY_ENDPOINT") {
            config.search.endpoint = endpoint;
        }
        config.search.max_results = env_or("MCP_SEARCH_MAX_RESULTS", config.search.max_results);
        config.search.fallback_on_error =
            env_flag("MCP_SEARCH_FALLBACK", config.search.fallback_on_error);

        match std::env::var("TAVILY_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                config.credentials.tavily_api_key = Some(key);
                info!("Tavily API key loaded from environment");
            }
            _ => {
                if config.registries.enabled.iter().any(|r| r == "search") {
                    warn!("TAVILY_API_KEY not set but the search registry is enabled");
                }
            }
        }

        config
    }
}
