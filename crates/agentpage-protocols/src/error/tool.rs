//! Tool call errors.
//!
//! A `ToolError` means the call could not produce a page view at all.
//! Failures that still have a manifest to show (a dispatch that found no
//! element, say) are reported as failed `ToolResult`s instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Parameters did not decode into the tool's parameter type.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Parameters failed the declared schema before the tool ran.
    #[error("Parameter validation failed: {0}")]
    ValidationFailed(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Tool execution timed out after {0} ms")]
    Timeout(u64),

    #[error("Tool call was cancelled")]
    Cancelled,

    /// A page or other resource named in the parameters does not exist.
    #[error("Not found: {0}")]
    ResourceNotFound(String),
}

impl ToolError {
    /// Wrap a serde error raised while decoding tool parameters.
    pub fn invalid_params(err: impl std::fmt::Display) -> Self {
        ToolError::InvalidParameters(err.to_string())
    }

    /// Short machine-readable kind, reported next to failed results.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "UnknownTool",
            ToolError::InvalidParameters(_) | ToolError::ValidationFailed(_) => "InvalidParams",
            ToolError::ExecutionFailed(_) => "ExecutionFailed",
            ToolError::Timeout(_) => "Timeout",
            ToolError::Cancelled => "Cancelled",
            ToolError::ResourceNotFound(_) => "NotFound",
        }
    }
}
