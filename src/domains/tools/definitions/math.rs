//! Math tools.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use thiserror::Error;

use crate::domains::tools::ToolDefinition;

/// Parameters for adding two integers.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddTwoParams {
    /// The first integer to add.
    #[schemars(description = "The first integer to add")]
    pub a: i64,

    /// The second integer to add.
    #[schemars(description = "The second integer to add")]
    pub b: i64,
}

/// The sum does not fit in a 64-bit integer.
#[derive(Debug, Error)]
#[error("integer overflow adding {a} and {b}")]
pub struct OverflowError {
    pub a: i64,
    pub b: i64,
}

/// Adds two integers.
#[derive(Debug, Clone, Default)]
pub struct AddTwoTool;

#[async_trait]
impl ToolDefinition for AddTwoTool {
    const NAME: &'static str = "add_two";
    const DESCRIPTION: &'static str =
        "Use this tool for adding two integers together. Returns the sum of the two integers.";
    type Params = AddTwoParams;
    type Output = i64;
    type Error = OverflowError;

    async fn call(&self, params: AddTwoParams) -> Result<i64, OverflowError> {
        let AddTwoParams { a, b } = params;
        a.checked_add(b).ok_or(OverflowError { a, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_two() {
        let sum = AddTwoTool.call(AddTwoParams { a: 2, b: 3 }).await.unwrap();
        assert_eq!(sum, 5);
    }

    #[tokio::test]
    async fn test_add_two_negative() {
        let sum = AddTwoTool.call(AddTwoParams { a: -7, b: 3 }).await.unwrap();
        assert_eq!(sum, -4);
    }

    #[tokio::test]
    async fn test_add_two_overflow() {
        let err = AddTwoTool
            .call(AddTwoParams { a: i64::MAX, b: 1 })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_params_reject_fractions() {
        let params: Result<AddTwoParams, _> = serde_json::from_str(r#"{"a": 1.5, "b": 2}"#);
        assert!(params.is_err());
    }
}
