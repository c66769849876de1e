//! HTTP transport implementation.
//!
//! JSON-RPC over POST for each mounted registry, following the MCP tool
//! methods. Responses are always plain JSON; streaming is not used.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::host::HostError;
use crate::domains::tools::ToolRegistry;

/// Protocol version answered when the client does not ask for a known one.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Protocol versions this host can speak.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// JSON-RPC error codes.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// The registry's session manager is not admitting requests.
    pub const UNAVAILABLE: i32 = -32000;
    /// No registry is mounted at the requested path.
    pub const NO_ROUTE: i32 = -32001;
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Requests without an id expect no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, codes::PARSE_ERROR, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, codes::METHOD_NOT_FOUND, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, codes::INVALID_REQUEST, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, codes::INVALID_PARAMS, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, codes::INTERNAL_ERROR, msg)
    }
}

/// State of one mounted registry.
#[derive(Clone)]
struct MountState {
    registry: Arc<ToolRegistry>,
}

/// Join a mount prefix and the RPC sub-path.
///
/// `None` when the sub-path is empty or `/`, in which case the registry only
/// answers at its prefix.
pub fn rpc_endpoint(prefix: &str, rpc_path: &str) -> Option<String> {
    let rpc_path = rpc_path.trim().trim_end_matches('/');
    if rpc_path.is_empty() {
        None
    } else if rpc_path.starts_with('/') {
        Some(format!("{}{}", prefix, rpc_path))
    } else {
        Some(format!("{}/{}", prefix, rpc_path))
    }
}

/// Build the routes answering JSON-RPC for one registry.
///
/// The registry answers at `prefix` and at `prefix` + `rpc_path`. Both paths
/// must already be valid axum route paths.
pub fn mount_router(prefix: &str, rpc_path: &str, registry: Arc<ToolRegistry>) -> Router {
    let mut router = Router::new().route(prefix, post(handle_rpc));

    if let Some(endpoint) = rpc_endpoint(prefix, rpc_path) {
        router = router.route(&endpoint, post(handle_rpc));
    }

    router.with_state(MountState { registry })
}

/// Health check endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// 404 for a path no registry is mounted under.
pub fn routing_failure(error: HostError) -> Response {
    warn!("{}", error);
    (
        StatusCode::NOT_FOUND,
        Json(JsonRpcResponse::error(None, codes::NO_ROUTE, error.to_string())),
    )
        .into_response()
}

/// 404 for a path under a registry's prefix that none of its endpoints
/// answer.
pub fn endpoint_not_found(registry: &str, path: &str, endpoints: &[String]) -> Response {
    warn!(registry = %registry, "No endpoint at {}", path);
    let message = format!(
        "Registry '{}' has no endpoint at {}; POST to {}",
        registry,
        path,
        endpoints.join(" or ")
    );
    (
        StatusCode::NOT_FOUND,
        Json(JsonRpcResponse::error(None, codes::NO_ROUTE, message)),
    )
        .into_response()
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(registry, method))]
async fn handle_rpc(
    State(state): State<MountState>,
    payload: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let span = tracing::Span::current();
    span.record("registry", state.registry.name());

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected JSON-RPC payload: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(JsonRpcResponse::parse_error(rejection.body_text())),
            )
                .into_response();
        }
    };
    span.record("method", request.method.as_str());

    let Some(_session) = state.registry.open_session() else {
        warn!("Registry is not accepting requests");
        let response = JsonRpcResponse::error(
            request.id,
            codes::UNAVAILABLE,
            format!("Registry '{}' is not accepting requests", state.registry.name()),
        );
        return (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response();
    };

    if request.is_notification() {
        info!("Received notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    info!("Received JSON-RPC request: {}", request.method);
    let response = process_request(&state, request).await;

    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &MountState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request).await,
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &MountState, request: JsonRpcRequest) -> JsonRpcResponse {
    let requested = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str());

    let protocol_version = match requested {
        Some(v) if SUPPORTED_PROTOCOL_VERSIONS.contains(&v) => v,
        _ => PROTOCOL_VERSION,
    };

    let result = serde_json::json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": state.registry.name(),
            "version": env!("CARGO_PKG_VERSION")
        }
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(state: &MountState, request: JsonRpcRequest) -> JsonRpcResponse {
    let tools: Vec<serde_json::Value> = state
        .registry
        .list_tools()
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema
            })
        })
        .collect();

    JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
}

/// Handle tools/call request.
async fn handle_tools_call(state: &MountState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
    };

    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n.to_string(),
        None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
    };

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    let result = match state.registry.invoke(&name, arguments).await {
        Ok(output) => call_result(output),
        Err(e) if e.is_request_error() => {
            return JsonRpcResponse::invalid_params(request.id, e.to_string());
        }
        Err(e) => {
            warn!("Tool call failed: {}", e);
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    };

    match serde_json::to_value(&result) {
        Ok(value) => JsonRpcResponse::success(request.id, value),
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

/// Wrap a tool's output as a successful call result.
///
/// Object outputs are used as structured content directly; anything else is
/// wrapped as `{"result": output}`.
fn call_result(output: serde_json::Value) -> CallToolResult {
    let text = match &output {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let structured = match output {
        object @ serde_json::Value::Object(_) => object,
        other => serde_json::json!({ "result": other }),
    };

    let mut result = CallToolResult::success(vec![Content::text(text)]);
    result.structured_content = Some(structured);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::{AddTwoTool, EchoTool, SecretPhraseTool};
    use crate::domains::tools::{SessionManager, StatelessSessionManager};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn echo_registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new("EchoServer");
        registry.register_tool(EchoTool).unwrap();
        registry.register_tool(SecretPhraseTool).unwrap();
        Arc::new(registry)
    }

    fn math_registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new("MathServer");
        registry.register_tool(AddTwoTool).unwrap();
        Arc::new(registry)
    }

    async fn post(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn rpc(app: Router, uri: &str, method: &str, params: Value) -> Value {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let (status, value) = post(app, uri, body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        value
    }

    #[tokio::test]
    async fn test_initialize_reports_registry_name() {
        let app = mount_router("/echo", "/mcp", echo_registry());
        let response = rpc(app, "/echo", "initialize", json!({ "protocolVersion": "2024-11-05" })).await;

        assert_eq!(response["result"]["serverInfo"]["name"], "EchoServer");
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_unknown_version_gets_default() {
        let app = mount_router("/echo", "/mcp", echo_registry());
        let response = rpc(app, "/echo", "initialize", json!({ "protocolVersion": "1999-01-01" })).await;
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_tools_list_on_rpc_sub_path() {
        let app = mount_router("/echo", "/mcp", echo_registry());
        let response = rpc(app, "/echo/mcp", "tools/list", json!({})).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["echo", "secret_phrase"]);
        assert!(tools[0]["inputSchema"]["properties"]["message"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_returns_text_and_structured_content() {
        let app = mount_router("/math", "/mcp", math_registry());
        let response = rpc(
            app,
            "/math",
            "tools/call",
            json!({ "name": "add_two", "arguments": { "a": 2, "b": 3 } }),
        )
        .await;

        let result = &response["result"];
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "5");
        assert_eq!(result["structuredContent"]["result"], 5);
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn test_tools_call_without_arguments() {
        let app = mount_router("/echo", "/mcp", echo_registry());
        let response = rpc(app, "/echo", "tools/call", json!({ "name": "secret_phrase" })).await;
        assert_eq!(
            response["result"]["content"][0]["text"],
            "the secret word is 'eureka'"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let app = mount_router("/math", "/mcp", math_registry());
        let response = rpc(app, "/math", "tools/call", json!({ "name": "nonexistent" })).await;

        assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .contains("Tool not found")
        );
    }

    #[tokio::test]
    async fn test_bad_arguments_are_invalid_params() {
        let app = mount_router("/math", "/mcp", math_registry());
        let response = rpc(
            app,
            "/math",
            "tools/call",
            json!({ "name": "add_two", "arguments": { "a": "x" } }),
        )
        .await;
        assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_handler_failure_is_error_result() {
        let app = mount_router("/math", "/mcp", math_registry());
        let response = rpc(
            app,
            "/math",
            "tools/call",
            json!({ "name": "add_two", "arguments": { "a": i64::MAX, "b": 1 } }),
        )
        .await;

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        assert!(
            response["result"]["content"][0]["text"]
                .as_str()
                .unwrap()
                .contains("overflow")
        );
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let app = mount_router("/math", "/mcp", math_registry());

        let response = rpc(app.clone(), "/math", "resources/list", json!({})).await;
        assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);

        let body = json!({ "jsonrpc": "1.0", "id": 7, "method": "ping" });
        let (_, response) = post(app.clone(), "/math", body.to_string()).await;
        assert_eq!(response["error"]["code"], codes::INVALID_REQUEST);
        assert_eq!(response["id"], 7);

        let (status, response) = post(app, "/math", "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let app = mount_router("/math", "/mcp", math_registry());
        let body = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
        let (status, response) = post(app, "/math", body.to_string()).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(response.is_null());
    }

    #[tokio::test]
    async fn test_registry_refuses_requests_until_session_manager_runs() {
        let sessions = Arc::new(StatelessSessionManager::new(
            "MathServer",
            8,
            Duration::from_millis(100),
        ));
        let mut registry = ToolRegistry::new("MathServer").with_session_manager(sessions.clone());
        registry.register_tool(AddTwoTool).unwrap();
        let app = mount_router("/math", "/mcp", Arc::new(registry));

        let ping = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string();
        let (status, response) = post(app.clone(), "/math", ping.clone()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response["error"]["code"], codes::UNAVAILABLE);

        sessions.start().await.unwrap();
        let (status, _) = post(app.clone(), "/math", ping.clone()).await;
        assert_eq!(status, StatusCode::OK);

        sessions.stop().await.unwrap();
        let (status, _) = post(app, "/math", ping).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_routing_failure_body() {
        let app = mount_router("/math", "/mcp", math_registry())
            .fallback(|uri: axum::http::Uri| async move {
                routing_failure(HostError::routing(uri.path()))
            });
        let (status, response) = post(app, "/nowhere", "{}".to_string()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(response["error"]["code"], codes::NO_ROUTE);
        assert!(response["error"]["message"].as_str().unwrap().contains("/nowhere"));
    }

    #[tokio::test]
    async fn test_endpoint_not_found_names_registry() {
        let endpoints = vec!["/math".to_string(), "/math/mcp".to_string()];
        let response = endpoint_not_found("MathServer", "/math/other", &endpoints);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("MathServer"));
        assert!(message.contains("/math/mcp"));
    }

    #[test]
    fn test_rpc_endpoint_join() {
        assert_eq!(rpc_endpoint("/math", "/mcp").as_deref(), Some("/math/mcp"));
        assert_eq!(rpc_endpoint("/math", "mcp/").as_deref(), Some("/math/mcp"));
        assert_eq!(rpc_endpoint("/math", "/"), None);
        assert_eq!(rpc_endpoint("/math", ""), None);
    }
}
