//! Tool Host Library
//!
//! This crate hosts several independent tool registries behind one HTTP
//! listener. Each registry is mounted under its own path prefix and speaks
//! JSON-RPC 2.0 (`initialize`, `tools/list`, `tools/call`).
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the host and its transport
//!   - **host**: mounting, routing and the session manager lifecycle
//!   - **transport**: HTTP configuration and the per-mount JSON-RPC router
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool definitions, registries and session managers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tool_host::core::{Config, McpHost};
//! use tool_host::domains::tools::build_registries;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let mut host = McpHost::new(config.server.name.clone(), config.transport.clone());
//!     for (prefix, registry) in build_registries(&config)? {
//!         host.mount(&prefix, Arc::new(registry))?;
//!     }
//!     host.run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpHost, Result};
