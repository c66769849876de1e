//! Tool-specific error types.

use thiserror::Error;

/// Boxed error used for handler failures whose concrete type is erased.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering or invoking tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The arguments did not match the tool's declared parameters.
    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// The tool handler itself failed.
    #[error("Tool '{tool}' failed: {source}")]
    Invocation {
        tool: String,
        #[source]
        source: BoxError,
    },

    /// A tool with the same name is already registered.
    #[error("Tool already registered: {0}")]
    Conflict(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new invocation error wrapping the handler's failure.
    pub fn invocation(tool: impl Into<String>, source: BoxError) -> Self {
        Self::Invocation {
            tool: tool.into(),
            source,
        }
    }

    /// Create a new "conflict" error.
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict(name.into())
    }

    /// Whether this error belongs to the caller (bad name or arguments)
    /// rather than to the tool.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidArguments { .. })
    }
}
