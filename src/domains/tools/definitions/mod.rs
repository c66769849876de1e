//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each group of tools is defined in its own file.

pub mod echo;
pub mod math;
pub mod physrisk;
pub mod search;

pub use echo::{EchoParams, EchoTool, NoParams, SecretPhraseTool};
pub use math::{AddTwoParams, AddTwoTool, OverflowError};
pub use physrisk::{AssetRiskTool, AssetVulnerabilityTool, HazardsTool, RiskQueryParams};
pub use search::{
    SearchBackend, SearchError, SearchHit, TavilyClient, WebSearchParams, WebSearchTool,
};
