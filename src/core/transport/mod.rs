//! HTTP transport for the tool host.
//!
//! Each mounted registry answers JSON-RPC 2.0 over `POST`. The host adds a
//! plain-text health check and a JSON index page.

mod config;
mod error;
pub mod http;

pub use config::{DEFAULT_PORT, HttpConfig};
pub use error::TransportError;
