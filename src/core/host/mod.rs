//! Tool host: composition and lifecycle of mounted registries.
//!
//! A [`McpHost`] owns a list of mounts, each binding a [`ToolRegistry`] to a
//! path prefix. [`McpHost::serve`] starts every registry's session manager,
//! serves HTTP until the shutdown future resolves, then stops them all.

mod error;
pub mod lifecycle;

use std::future::Future;
use std::sync::Arc;

use axum::{Json, Router, http::Uri, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use error::{HostError, ShutdownIssue};
pub use lifecycle::{LifecycleScope, ManagedSessions};

use super::transport::{HttpConfig, TransportError, http};
use crate::domains::tools::ToolRegistry;

/// Paths the host answers itself.
const RESERVED_PATHS: &[&str] = &["/health"];

/// A registry bound to a path prefix.
#[derive(Debug, Clone)]
pub struct Mount {
    prefix: String,
    registry: Arc<ToolRegistry>,
}

impl Mount {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Whether `path` falls under this mount's prefix.
    fn matches(&self, path: &str) -> bool {
        is_segment_prefix(&self.prefix, path)
    }
}

/// `prefix` equals `path` or is followed in `path` by a `/`.
fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Why `path` cannot be registered as a literal route, if it cannot.
///
/// axum treats `{`, `}` and segments starting with `:` or `*` as captures
/// and panics on the latter two.
fn literal_path_issue(path: &str) -> Option<&'static str> {
    if path.contains(['{', '}', '*']) {
        return Some("must not contain '{', '}' or '*'");
    }
    if path.contains("//") {
        return Some("must not contain empty segments");
    }
    if path.split('/').any(|segment| segment.starts_with(':')) {
        return Some("segments must not start with ':'");
    }
    None
}

/// Find the mount whose prefix covers `path`.
fn find_mount<'a>(mounts: &'a [Mount], path: &str) -> Result<&'a Mount, HostError> {
    mounts
        .iter()
        .find(|m| m.matches(path))
        .ok_or_else(|| HostError::routing(path))
}

/// Paths answering JSON-RPC for a mount under `prefix`.
fn mount_endpoints(prefix: &str, rpc_path: &str) -> Vec<String> {
    let mut endpoints = vec![prefix.to_string()];
    endpoints.extend(http::rpc_endpoint(prefix, rpc_path));
    endpoints
}

/// Normalize a mount prefix: leading `/`, no trailing `/`.
fn normalize_prefix(prefix: &str) -> Result<String, HostError> {
    let trimmed = prefix.trim();
    if !trimmed.starts_with('/') {
        return Err(HostError::invalid_mount(prefix, "must start with '/'"));
    }
    if let Some(reason) = literal_path_issue(trimmed) {
        return Err(HostError::invalid_mount(prefix, reason));
    }

    let normalized = trimmed.trim_end_matches('/');
    if normalized.is_empty() {
        return Err(HostError::invalid_mount(prefix, "the root path cannot be mounted"));
    }
    Ok(normalized.to_string())
}

/// HTTP host for several tool registries.
pub struct McpHost {
    name: String,
    config: HttpConfig,
    mounts: Vec<Mount>,
}

impl McpHost {
    /// Create a host with no mounts.
    pub fn new(name: impl Into<String>, config: HttpConfig) -> Self {
        Self {
            name: name.into(),
            config,
            mounts: Vec::new(),
        }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Mounts in mount order.
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    fn endpoints(&self, prefix: &str) -> Vec<String> {
        mount_endpoints(prefix, &self.config.rpc_path)
    }

    /// Bind `registry` under `prefix`.
    ///
    /// Fails without changing the host if the prefix overlaps an existing
    /// mount or a reserved path, if the registry is already mounted, or if
    /// the configured RPC sub-path cannot be routed under the prefix.
    pub fn mount(&mut self, prefix: &str, registry: Arc<ToolRegistry>) -> Result<(), HostError> {
        let prefix = normalize_prefix(prefix)?;

        if let Some(endpoint) = http::rpc_endpoint(&prefix, &self.config.rpc_path) {
            if let Some(reason) = literal_path_issue(&endpoint) {
                return Err(HostError::invalid_mount(
                    endpoint,
                    format!("RPC path {:?} {}", self.config.rpc_path, reason),
                ));
            }
        }

        if RESERVED_PATHS
            .iter()
            .any(|reserved| is_segment_prefix(reserved, &prefix) || is_segment_prefix(&prefix, reserved))
        {
            return Err(HostError::conflict(format!("'{}' is reserved by the host", prefix)));
        }

        for existing in &self.mounts {
            if is_segment_prefix(&existing.prefix, &prefix) || is_segment_prefix(&prefix, &existing.prefix) {
                return Err(HostError::conflict(format!(
                    "'{}' overlaps '{}' (registry '{}')",
                    prefix,
                    existing.prefix,
                    existing.registry.name()
                )));
            }
            if Arc::ptr_eq(&existing.registry, &registry) {
                return Err(HostError::conflict(format!(
                    "registry '{}' is already mounted at '{}'",
                    registry.name(),
                    existing.prefix
                )));
            }
        }

        if registry.is_empty() {
            warn!(registry = %registry.name(), "Mounting a registry with no tools");
        }
        info!(registry = %registry.name(), prefix = %prefix, tools = registry.len(), "Mounted registry");
        self.mounts.push(Mount { prefix, registry });
        Ok(())
    }

    /// Find the mount serving `path`.
    pub fn route(&self, path: &str) -> Result<&Mount, HostError> {
        find_mount(&self.mounts, path)
    }

    /// Session managers of all mounts, in mount order.
    pub fn session_managers(&self) -> Vec<ManagedSessions> {
        self.mounts
            .iter()
            .filter_map(|m| {
                m.registry
                    .session_manager()
                    .map(|manager| ManagedSessions::new(m.registry.name(), manager.clone()))
            })
            .collect()
    }

    /// Index document served at `/`.
    fn index(&self) -> serde_json::Value {
        let mounts: Vec<_> = self
            .mounts
            .iter()
            .map(|m| {
                serde_json::json!({
                    "prefix": m.prefix,
                    "endpoint": http::rpc_endpoint(&m.prefix, &self.config.rpc_path)
                        .unwrap_or_else(|| m.prefix.clone()),
                    "registry": m.registry.name(),
                    "tools": m.registry.tool_names()
                })
            })
            .collect();

        serde_json::json!({
            "name": self.name,
            "version": env!("CARGO_PKG_VERSION"),
            "transport": "HTTP",
            "protocol": "JSON-RPC 2.0",
            "health": "/health",
            "mounts": mounts,
        })
    }

    /// Build the HTTP router for every mount plus the host's own routes.
    pub fn router(&self) -> Router {
        let index = Arc::new(self.index());
        let mut app = Router::new()
            .route("/health", get(http::health_check))
            .route(
                "/",
                get(move || {
                    let index = index.clone();
                    async move {
                        let mut body = (*index).clone();
                        body["timestamp"] = serde_json::json!(chrono::Utc::now().to_rfc3339());
                        Json(body)
                    }
                }),
            );

        for mount in &self.mounts {
            app = app.merge(http::mount_router(
                &mount.prefix,
                &self.config.rpc_path,
                mount.registry.clone(),
            ));
        }

        // Unmatched paths: scoped to the covering registry when one exists.
        let mounts: Arc<[Mount]> = self.mounts.clone().into();
        let rpc_path: Arc<str> = self.config.rpc_path.as_str().into();
        app = app.fallback(move |uri: Uri| {
            let mounts = mounts.clone();
            let rpc_path = rpc_path.clone();
            async move {
                let path = uri.path();
                match find_mount(&mounts, path) {
                    Ok(mount) => http::endpoint_not_found(
                        mount.registry.name(),
                        path,
                        &mount_endpoints(&mount.prefix, &rpc_path),
                    ),
                    Err(error) => http::routing_failure(error),
                }
            }
        });

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), HostError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on `listener` inside the lifecycle scope.
    ///
    /// Session managers are started before the first request is accepted
    /// and stopped after the server has drained, even if serving failed.
    /// Stop failures are logged and do not fail the run.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), HostError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let scope = LifecycleScope::enter(self.session_managers()).await?;

        match listener.local_addr() {
            Ok(addr) => info!("Ready - listening on {} ({})", addr, self.config.description()),
            Err(_) => info!("Ready ({})", self.config.description()),
        }
        for mount in &self.mounts {
            info!(
                "  → {}: POST {}",
                mount.registry.name(),
                self.endpoints(&mount.prefix).join(" | ")
            );
        }
        info!("  → Health: GET /health");

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(TransportError::serve);

        info!("HTTP server stopped, shutting down registries");
        if let Err(e) = scope.exit().await {
            error!("{}", e);
        }

        served.map_err(HostError::from)
    }
}
