//! Tool handler traits.
//!
//! Tools are written against [`ToolDefinition`], which declares a typed
//! parameter struct and a typed output. The registry stores them behind the
//! object-safe [`ToolHandler`] trait, which works on raw JSON values.
//! [`TypedHandler`] bridges the two.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::error::BoxError;

/// Failure reported by a [`ToolHandler`].
///
/// The registry attaches the tool name when turning this into a
/// [`ToolError`](super::ToolError).
#[derive(Debug)]
pub enum HandlerError {
    /// The arguments could not be decoded into the tool's parameters.
    InvalidArguments(String),

    /// The handler ran and failed.
    Failed(BoxError),
}

/// Object-safe handler stored in a registry.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// JSON schema of the accepted arguments.
    fn input_schema(&self) -> Arc<JsonObject>;

    /// Execute the tool with the given JSON arguments.
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, HandlerError>;
}

/// A tool with a typed signature.
///
/// ```rust,ignore
/// struct Shout;
///
/// #[async_trait]
/// impl ToolDefinition for Shout {
///     const NAME: &'static str = "shout";
///     const DESCRIPTION: &'static str = "Upper-case a message";
///     type Params = ShoutParams;
///     type Output = String;
///     type Error = std::convert::Infallible;
///
///     async fn call(&self, params: ShoutParams) -> Result<String, Self::Error> {
///         Ok(params.message.to_uppercase())
///     }
/// }
/// ```
#[async_trait]
pub trait ToolDefinition: Send + Sync + 'static {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Declared parameters. The input schema is derived from this type.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    /// Declared return type.
    type Output: Serialize + Send;

    /// Failure type of the handler.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute the tool.
    async fn call(&self, params: Self::Params) -> Result<Self::Output, Self::Error>;
}

/// Adapts a [`ToolDefinition`] to the JSON-level [`ToolHandler`].
pub struct TypedHandler<T: ToolDefinition> {
    tool: T,
}

impl<T: ToolDefinition> TypedHandler<T> {
    pub fn new(tool: T) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl<T: ToolDefinition> ToolHandler for TypedHandler<T> {
    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<T::Params>()
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, HandlerError> {
        // Clients may omit arguments entirely for parameterless tools.
        let arguments = match arguments {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };

        let params: T::Params = serde_json::from_value(arguments)
            .map_err(|e| HandlerError::InvalidArguments(e.to_string()))?;

        let output = self
            .tool
            .call(params)
            .await
            .map_err(|e| HandlerError::Failed(Box::new(e)))?;

        serde_json::to_value(output).map_err(|e| HandlerError::Failed(Box::new(e)))
    }
}

/// Substitutes a fixed value when the wrapped tool fails.
///
/// The substitute has the tool's own output type, so callers always see a
/// well-typed result. Failures are logged, never returned.
pub struct WithFallback<T: ToolDefinition> {
    inner: T,
    fallback: T::Output,
}

impl<T> WithFallback<T>
where
    T: ToolDefinition,
    T::Output: Clone + Sync + 'static,
{
    pub fn new(inner: T, fallback: T::Output) -> Self {
        Self { inner, fallback }
    }
}

#[async_trait]
impl<T> ToolDefinition for WithFallback<T>
where
    T: ToolDefinition,
    T::Output: Clone + Sync + 'static,
{
    const NAME: &'static str = T::NAME;
    const DESCRIPTION: &'static str = T::DESCRIPTION;
    type Params = T::Params;
    type Output = T::Output;
    type Error = std::convert::Infallible;

    async fn call(&self, params: Self::Params) -> Result<Self::Output, Self::Error> {
        match self.inner.call(params).await {
            Ok(output) => Ok(output),
            Err(e) => {
                warn!(tool = T::NAME, error = %e, "Tool failed, substituting fallback value");
                Ok(self.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct CountParams {
        /// Number of items to produce.
        count: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("count too large: {0}")]
    struct TooLarge(u32);

    struct Counter;

    #[async_trait]
    impl ToolDefinition for Counter {
        const NAME: &'static str = "counter";
        const DESCRIPTION: &'static str = "Produce a list of numbers";
        type Params = CountParams;
        type Output = Vec<u32>;
        type Error = TooLarge;

        async fn call(&self, params: CountParams) -> Result<Vec<u32>, TooLarge> {
            if params.count > 3 {
                return Err(TooLarge(params.count));
            }
            Ok((0..params.count).collect())
        }
    }

    #[tokio::test]
    async fn test_typed_handler_success() {
        let handler = TypedHandler::new(Counter);
        let result = handler.call(json!({ "count": 2 })).await.unwrap();
        assert_eq!(result, json!([0, 1]));
    }

    #[tokio::test]
    async fn test_typed_handler_rejects_bad_arguments() {
        let handler = TypedHandler::new(Counter);
        let err = handler.call(json!({ "count": "two" })).await.unwrap_err();
        assert!(matches!(err, HandlerError::InvalidArguments(_)));

        let err = handler.call(json!({})).await.unwrap_err();
        assert!(matches!(err, HandlerError::InvalidArguments(msg) if msg.contains("count")));
    }

    #[tokio::test]
    async fn test_typed_handler_reports_failure() {
        let handler = TypedHandler::new(Counter);
        let err = handler.call(json!({ "count": 9 })).await.unwrap_err();
        match err {
            HandlerError::Failed(source) => assert_eq!(source.to_string(), "count too large: 9"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_schema_lists_parameters() {
        let schema = TypedHandler::new(Counter).input_schema();
        let properties = schema.get("properties").and_then(|p| p.as_object()).unwrap();
        assert!(properties.contains_key("count"));
    }

    #[tokio::test]
    async fn test_fallback_substitutes_on_error() {
        let tool = WithFallback::new(Counter, Vec::new());
        assert_eq!(tool.call(CountParams { count: 2 }).await.unwrap(), vec![0, 1]);
        assert!(tool.call(CountParams { count: 9 }).await.unwrap().is_empty());
        assert_eq!(<WithFallback<Counter> as ToolDefinition>::NAME, "counter");
    }
}
