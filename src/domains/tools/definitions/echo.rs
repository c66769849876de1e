//! Echo tools.
//!
//! The simplest possible tools: one repeats its input back with a prefix,
//! the other returns a fixed phrase. Useful for checking that a client can
//! reach a mounted registry at all.

use std::convert::Infallible;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::ToolDefinition;

/// Parameters for the echo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EchoParams {
    /// The message to echo back.
    #[schemars(description = "The message to echo back")]
    pub message: String,
}

/// Tool without parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Echo tool implementation.
#[derive(Debug, Clone, Default)]
pub struct EchoTool;

#[async_trait]
impl ToolDefinition for EchoTool {
    const NAME: &'static str = "echo";
    const DESCRIPTION: &'static str =
        "Use this tool for echoing back a message. Returns the message with an \"Echo: \" prefix.";
    type Params = EchoParams;
    type Output = String;
    type Error = Infallible;

    async fn call(&self, params: EchoParams) -> Result<String, Infallible> {
        Ok(format!("Echo: {}", params.message))
    }
}

/// Test tool that returns a secret word.
#[derive(Debug, Clone, Default)]
pub struct SecretPhraseTool;

impl SecretPhraseTool {
    pub const PHRASE: &'static str = "the secret word is 'eureka'";
}

#[async_trait]
impl ToolDefinition for SecretPhraseTool {
    const NAME: &'static str = "secret_phrase";
    const DESCRIPTION: &'static str = "Test tool that returns a secret word";
    type Params = NoParams;
    type Output = &'static str;
    type Error = Infallible;

    async fn call(&self, _params: NoParams) -> Result<&'static str, Infallible> {
        Ok(Self::PHRASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_prefixes_message() {
        let params = EchoParams {
            message: "hi".to_string(),
        };
        assert_eq!(EchoTool.call(params).await.unwrap(), "Echo: hi");
    }

    #[tokio::test]
    async fn test_echo_keeps_empty_message() {
        let params = EchoParams {
            message: String::new(),
        };
        assert_eq!(EchoTool.call(params).await.unwrap(), "Echo: ");
    }

    #[tokio::test]
    async fn test_secret_phrase() {
        let phrase = SecretPhraseTool.call(NoParams {}).await.unwrap();
        assert_eq!(phrase, "the secret word is 'eureka'");
    }

    #[test]
    fn test_no_params_accepts_empty_object() {
        let params: Result<NoParams, _> = serde_json::from_str("{}");
        assert!(params.is_ok());
    }
}
