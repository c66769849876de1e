//! Web search tool.
//!
//! The tool is backend-agnostic: it receives its [`SearchBackend`] at
//! construction. [`TavilyClient`] is the production backend.
//!
//! Search failures are returned as errors. Wrap the tool in
//! [`WithFallback`](crate::domains::tools::WithFallback) to answer with an
//! empty result list instead.

pub mod tavily;

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domains::tools::ToolDefinition;

pub use tavily::TavilyClient;

/// Errors from web search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A web search provider.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Parameters for web search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    /// The search query.
    #[schemars(description = "The search query")]
    pub query: String,
}

/// Web search tool implementation.
#[derive(Clone)]
pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolDefinition for WebSearchTool {
    const NAME: &'static str = "web_search";
    const DESCRIPTION: &'static str =
        "Use this tool to search the web for information. Returns the search results.";
    type Params = WebSearchParams;
    type Output = Vec<SearchHit>;
    type Error = SearchError;

    async fn call(&self, params: WebSearchParams) -> Result<Vec<SearchHit>, SearchError> {
        let query = params.query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        info!("Searching the web for: {}", query);
        let hits = self.backend.search(query).await?;
        info!("Web search returned {} result(s)", hits.len());
        Ok(hits)
    }
}
