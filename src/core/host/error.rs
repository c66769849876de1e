//! Host error types.

use thiserror::Error;

use crate::core::transport::TransportError;
use crate::domains::tools::SessionError;

/// A session manager that failed to stop.
#[derive(Debug)]
pub struct ShutdownIssue {
    pub registry: String,
    pub error: SessionError,
}

impl std::fmt::Display for ShutdownIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.registry, self.error)
    }
}

/// Errors raised while composing or running a host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The prefix or registry is already mounted.
    #[error("Mount conflict: {0}")]
    Conflict(String),

    /// The prefix cannot be used as a mount point.
    #[error("Invalid mount prefix {prefix:?}: {reason}")]
    InvalidMount { prefix: String, reason: String },

    /// No registry is mounted at the path.
    #[error("No registry mounted at path: {0}")]
    Routing(String),

    /// A registry's session manager failed to start. Registries started
    /// before it were stopped again; `rollback` holds any failures from
    /// that unwind.
    #[error("Registry '{registry}' failed to start: {source}")]
    StartupFailure {
        registry: String,
        #[source]
        source: SessionError,
        rollback: Vec<ShutdownIssue>,
    },

    /// One or more session managers failed to stop.
    #[error("{} session manager(s) failed to stop: {}", .0.len(), join_issues(.0))]
    ShutdownFailure(Vec<ShutdownIssue>),

    /// The listener could not be bound or the server failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

fn join_issues(issues: &[ShutdownIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl HostError {
    /// Create a new "conflict" error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a new "invalid mount" error.
    pub fn invalid_mount(prefix: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMount {
            prefix: prefix.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "routing" error.
    pub fn routing(path: impl Into<String>) -> Self {
        Self::Routing(path.into())
    }
}
