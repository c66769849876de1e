//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the tool host,
//! including error handling, configuration, the host itself and its HTTP
//! transport.

pub mod config;
pub mod error;
pub mod host;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use host::{HostError, LifecycleScope, ManagedSessions, McpHost, Mount};
pub use transport::{HttpConfig, TransportError};
