//! Tool Registry - a named collection of tools sharing one lifecycle.
//!
//! This module provides:
//! - Registration of tools under unique names
//! - Dispatch of calls to the registered handlers
//! - Tool metadata for listing
//! - The registry's optional session manager

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::model::Tool;
use tracing::{debug, info, warn};

use super::error::ToolError;
use super::handlers::{HandlerError, ToolDefinition, ToolHandler, TypedHandler};
use super::session::{Session, SessionManager};

/// A tool's metadata together with its handler.
struct RegisteredTool {
    tool: Tool,
    handler: Arc<dyn ToolHandler>,
}

/// A namespaced set of tools.
///
/// Tools are kept sorted by name so listings are stable. The set is fixed
/// once the registry is shared with a host.
pub struct ToolRegistry {
    name: String,
    tools: BTreeMap<String, RegisteredTool>,
    sessions: Option<Arc<dyn SessionManager>>,
}

impl ToolRegistry {
    /// Create an empty registry without a session manager.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: BTreeMap::new(),
            sessions: None,
        }
    }

    /// Attach the session manager the host will start and stop.
    pub fn with_session_manager(mut self, sessions: Arc<dyn SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Registry name, reported to clients as the server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a handler under `name`.
    ///
    /// Returns the tool metadata. Fails without modifying the registry if
    /// the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<Tool, ToolError> {
        let name = name.into();
        let description: String = description.into();
        if self.tools.contains_key(&name) {
            warn!(registry = %self.name, tool = %name, "Duplicate tool registration");
            return Err(ToolError::conflict(name));
        }

        let tool = Tool {
            name: name.clone().into(),
            description: Some(description.into()),
            input_schema: handler.input_schema(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        };

        debug!(registry = %self.name, tool = %name, "Registering tool");
        self.tools.insert(
            name,
            RegisteredTool {
                tool: tool.clone(),
                handler,
            },
        );
        Ok(tool)
    }

    /// Register a typed tool under its declared name and description.
    pub fn register_tool<T: ToolDefinition>(&mut self, tool: T) -> Result<Tool, ToolError> {
        self.register(T::NAME, T::DESCRIPTION, Arc::new(TypedHandler::new(tool)))
    }

    /// Get all tool names, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Get all tools as Tool models (metadata), sorted by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.values().map(|t| t.tool.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call to the named tool.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let Some(entry) = self.tools.get(name) else {
            warn!(registry = %self.name, "Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        info!(registry = %self.name, tool = %name, "Invoking tool");
        entry.handler.call(arguments).await.map_err(|e| match e {
            HandlerError::InvalidArguments(message) => ToolError::invalid_arguments(name, message),
            HandlerError::Failed(source) => ToolError::invocation(name, source),
        })
    }

    /// The registry's session manager, if any.
    pub fn session_manager(&self) -> Option<&Arc<dyn SessionManager>> {
        self.sessions.as_ref()
    }

    /// Admit one request.
    ///
    /// Registries without a session manager always admit.
    pub fn open_session(&self) -> Option<Session> {
        match &self.sessions {
            Some(sessions) => sessions.open_session(),
            None => Some(Session::untracked()),
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .field("has_session_manager", &self.sessions.is_some())
            .finish()
    }
}
