//! Tool call results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;
use crate::types::Metadata;

/// Outcome of a tool call as written back to the controller.
///
/// `content` is the text the controller reads (usually a page manifest);
/// `structured_output` carries the same facts as JSON. A failed call can
/// still carry content, so the controller sees the page after a failed
/// action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl ToolResult {
    fn build(success: bool, content: String, error: Option<String>) -> Self {
        Self {
            success,
            content,
            structured_output: None,
            error,
            metadata: Metadata::new(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::build(true, content.into(), None)
    }

    pub fn success_json(content: impl Into<String>, output: Value) -> Self {
        Self::success(content).with_structured_output(output)
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::build(false, String::new(), Some(error.into()))
    }

    /// A failure that still reports the page.
    pub fn error_with_content(error: impl Into<String>, content: impl Into<String>) -> Self {
        Self::build(false, content.into(), Some(error.into()))
    }

    /// A failure for a call that raised `err`, tagged with its kind.
    pub fn from_error(err: &ToolError) -> Self {
        Self::error(err.to_string()).with_metadata("error_kind", Value::from(err.kind()))
    }

    pub fn with_structured_output(mut self, output: Value) -> Self {
        self.structured_output = Some(output);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
