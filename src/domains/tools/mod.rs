//! Tools domain module.
//!
//! Tools are executable functions that clients call through a registry.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per group)
//! - `handlers.rs` - Typed tool trait and its JSON-level erasure
//! - `registry.rs` - Named tool collections and dispatch
//! - `session.rs` - Per-registry session managers
//! - `catalog.rs` - Built-in registries and their mount prefixes
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a params struct and implement [`ToolDefinition`] in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in the matching registry builder in `catalog.rs`

pub mod catalog;
pub mod definitions;
mod error;
mod handlers;
mod registry;
mod session;

pub use catalog::build_registries;
pub use error::{BoxError, ToolError};
pub use handlers::*;
pub use registry::ToolRegistry;
pub use session::{Session, SessionError, SessionManager, StatelessSessionManager};
