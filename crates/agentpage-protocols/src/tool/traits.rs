//! Tool trait definition.

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;

/// One operation a controller can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn execute(&self, params: Value, ctx: ToolContext) -> Result<ToolResult, ToolError>;

    /// Cheap structural check run by the registry before `execute`.
    ///
    /// With a declared schema the parameters must be an object holding
    /// every `required` key. Types are left to the tool's own decoding.
    fn validate(&self, params: &Value) -> Result<(), ToolError> {
        let definition = self.definition();
        if definition.parameters_schema.is_none() {
            return Ok(());
        }
        let Some(object) = params.as_object() else {
            return Err(ToolError::ValidationFailed(
                "Parameters must be an object".to_string(),
            ));
        };
        if let Some(missing) = definition
            .required_params()
            .into_iter()
            .find(|name| object.get(*name).is_none_or(Value::is_null))
        {
            return Err(ToolError::ValidationFailed(format!(
                "Missing required parameter '{}'",
                missing
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        fn new(schema: Option<Value>) -> Self {
            let mut definition = ToolDefinition::new("echo", "Echo", "Echoes its parameters");
            if let Some(schema) = schema {
                definition = definition.with_parameters_schema(schema);
            }
            Self { definition }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::success(params.to_string()))
        }
    }

    fn page_schema() -> Value {
        json!({
            "type": "object",
            "properties": {"page_id": {"type": "string"}},
            "required": ["page_id"]
        })
    }

    #[test]
    fn test_validate_without_schema_accepts_anything() {
        let tool = EchoTool::new(None);
        assert!(tool.validate(&json!("text")).is_ok());
        assert!(tool.validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_objects() {
        let tool = EchoTool::new(Some(page_schema()));
        for bad in [json!([1, 2]), json!(42), Value::Null] {
            match tool.validate(&bad) {
                Err(ToolError::ValidationFailed(msg)) => assert!(msg.contains("must be an object")),
                other => panic!("expected ValidationFailed, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_validate_required_keys() {
        let tool = EchoTool::new(Some(page_schema()));
        assert!(tool.validate(&json!({"page_id": "page_1"})).is_ok());

        for bad in [json!({}), json!({"page_id": null})] {
            let err = tool.validate(&bad).unwrap_err();
            assert!(err.to_string().contains("'page_id'"), "{err}");
        }
    }

    #[tokio::test]
    async fn test_execute_echoes_params() {
        let tool = EchoTool::new(None);
        let ctx = ToolContext::new("test", PathBuf::from("/tmp"));
        let result = tool.execute(json!({"id": "email"}), ctx).await.unwrap();
        assert!(result.content.contains("email"));
    }
}
