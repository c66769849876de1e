//! Built-in registries and the prefixes they mount under.
//!
//! Each registry gets its own [`StatelessSessionManager`] sized from
//! [`SessionsConfig`](crate::core::config::SessionsConfig).

use std::sync::Arc;

use tracing::info;

use super::definitions::{
    AddTwoTool, AssetRiskTool, AssetVulnerabilityTool, EchoTool, HazardsTool, SecretPhraseTool,
    TavilyClient, WebSearchTool,
};
use super::{StatelessSessionManager, ToolRegistry, WithFallback};
use crate::core::config::Config;
use crate::core::error::{Error, Result};

/// Registry names accepted in `MCP_REGISTRIES`.
pub const KNOWN_REGISTRIES: &[&str] = &["echo", "math", "physrisk", "search"];

fn with_sessions(name: &str, config: &Config) -> ToolRegistry {
    let sessions = StatelessSessionManager::new(
        name,
        config.sessions.max_sessions,
        config.sessions.drain_timeout(),
    );
    ToolRegistry::new(name).with_session_manager(Arc::new(sessions))
}

/// `echo` and `secret_phrase`.
pub fn echo_registry(config: &Config) -> Result<ToolRegistry> {
    let mut registry = with_sessions("EchoServer", config);
    registry.register_tool(EchoTool)?;
    registry.register_tool(SecretPhraseTool)?;
    Ok(registry)
}

/// `add_two`.
pub fn math_registry(config: &Config) -> Result<ToolRegistry> {
    let mut registry = with_sessions("MathServer", config);
    registry.register_tool(AddTwoTool)?;
    Ok(registry)
}

/// The three physical-risk lookups.
pub fn physrisk_registry(config: &Config) -> Result<ToolRegistry> {
    let mut registry = with_sessions("physrisk", config);
    registry.register_tool(HazardsTool)?;
    registry.register_tool(AssetVulnerabilityTool)?;
    registry.register_tool(AssetRiskTool)?;
    Ok(registry)
}

/// `web_search` backed by Tavily. Requires `TAVILY_API_KEY`.
pub fn search_registry(config: &Config) -> Result<ToolRegistry> {
    let api_key = config
        .credentials
        .tavily_api_key
        .as_deref()
        .ok_or_else(|| Error::config("TAVILY_API_KEY is required for the search registry"))?;

    let client = TavilyClient::new(api_key, &config.search.endpoint, config.search.max_results)
        .map_err(|e| Error::config(format!("Failed to build search client: {}", e)))?;
    info!(endpoint = %client.endpoint(), "Search backend configured");
    let tool = WebSearchTool::new(Arc::new(client));

    let mut registry = with_sessions("web-search", config);
    if config.search.fallback_on_error {
        info!("Search failures will answer with an empty result list");
        registry.register_tool(WithFallback::new(tool, Vec::new()))?;
    } else {
        registry.register_tool(tool)?;
    }
    Ok(registry)
}

/// Build the enabled registries, paired with their mount prefixes, in the
/// configured order.
pub fn build_registries(config: &Config) -> Result<Vec<(String, ToolRegistry)>> {
    config
        .registries
        .enabled
        .iter()
        .map(|name| {
            let registry = match name.as_str() {
                "echo" => echo_registry(config)?,
                "math" => math_registry(config)?,
                "physrisk" => physrisk_registry(config)?,
                "search" => search_registry(config)?,
                other => {
                    return Err(Error::config(format!(
                        "Unknown registry '{}' (expected one of: {})",
                        other,
                        KNOWN_REGISTRIES.join(", ")
                    )));
                }
            };
            Ok((format!("/{}", name), registry))
        })
        .collect()
}
