//! Physical-risk tools.
//!
//! Placeholder tools for a physical climate risk service. Each one answers
//! with a canned sentence that quotes the query, which is enough for agents
//! to exercise tool selection against a remote host.

use std::convert::Infallible;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::ToolDefinition;

/// Parameters shared by the physical-risk tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RiskQueryParams {
    /// Free-form query text.
    #[schemars(description = "The query to look up")]
    pub query: String,
}

fn answer(subject: &str, query: &str) -> String {
    format!("RENDER SERVER -> Your {} was: {}", subject, query)
}

/// Hazard lookup.
#[derive(Debug, Clone, Default)]
pub struct HazardsTool;

#[async_trait]
impl ToolDefinition for HazardsTool {
    const NAME: &'static str = "get_physrisk_hazards";
    const DESCRIPTION: &'static str = "Use this tool for getting the hazards.";
    type Params = RiskQueryParams;
    type Output = String;
    type Error = Infallible;

    async fn call(&self, params: RiskQueryParams) -> Result<String, Infallible> {
        Ok(answer("hazard", &params.query))
    }
}

/// Asset vulnerability lookup.
#[derive(Debug, Clone, Default)]
pub struct AssetVulnerabilityTool;

#[async_trait]
impl ToolDefinition for AssetVulnerabilityTool {
    const NAME: &'static str = "get_asset_vulnerability";
    const DESCRIPTION: &'static str = "Use this tool for getting the asset vulnerability.";
    type Params = RiskQueryParams;
    type Output = String;
    type Error = Infallible;

    async fn call(&self, params: RiskQueryParams) -> Result<String, Infallible> {
        Ok(answer("asset vulnerability", &params.query))
    }
}

/// Asset risk lookup.
#[derive(Debug, Clone, Default)]
pub struct AssetRiskTool;

#[async_trait]
impl ToolDefinition for AssetRiskTool {
    const NAME: &'static str = "get_asset_risk";
    const DESCRIPTION: &'static str = "Use this tool for getting the asset risk.";
    type Params = RiskQueryParams;
    type Output = String;
    type Error = Infallible;

    async fn call(&self, params: RiskQueryParams) -> Result<String, Infallible> {
        Ok(answer("asset risk", &params.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str) -> RiskQueryParams {
        RiskQueryParams {
            query: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_answers_quote_the_query() {
        assert_eq!(
            HazardsTool.call(query("flood")).await.unwrap(),
            "RENDER SERVER -> Your hazard was: flood"
        );
        assert_eq!(
            AssetVulnerabilityTool.call(query("bridge")).await.unwrap(),
            "RENDER SERVER -> Your asset vulnerability was: bridge"
        );
        assert_eq!(
            AssetRiskTool.call(query("port")).await.unwrap(),
            "RENDER SERVER -> Your asset risk was: port"
        );
    }
}
