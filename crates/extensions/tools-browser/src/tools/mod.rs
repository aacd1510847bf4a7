//! Browser tools.
//!
//! Thin adapters from JSON tool calls onto [`BrowserManager`] and
//! [`AgentPage`]. Every page-changing tool answers with the fresh manifest
//! text followed by a change summary.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use agentpage_protocols::error::ToolError;
use agentpage_protocols::tool::ToolResult;

use crate::agent::{AgentError, AgentPage, PageUpdate};
use crate::manager::{BrowserError, BrowserManager};

mod actions;
mod content;
mod navigation;
mod page;

pub use actions::*;
pub use content::*;
pub use navigation::*;
pub use page::*;

/// Longest wait a tool call may request.
const MAX_TIMEOUT_MS: u64 = 120_000;

pub(crate) fn default_wait_timeout() -> u64 {
    5000
}

pub(crate) fn default_true() -> bool {
    true
}

/// Clamp a caller-supplied timeout into `1..=MAX_TIMEOUT_MS` milliseconds.
pub(crate) fn timeout_from_ms(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(1, MAX_TIMEOUT_MS))
}

pub(crate) async fn get_page(
    manager: &BrowserManager,
    page_id: &str,
) -> Result<Arc<AgentPage>, ToolError> {
    manager.get_page(page_id).await.map_err(browser_error)
}

pub(crate) fn browser_error(e: BrowserError) -> ToolError {
    match e {
        BrowserError::PageNotFound(id) => ToolError::ResourceNotFound(id),
        BrowserError::Page(e) => agent_error(e),
        other => ToolError::ExecutionFailed(other.to_string()),
    }
}

pub(crate) fn agent_error(e: AgentError) -> ToolError {
    match e {
        AgentError::InvalidUrl { .. } => ToolError::InvalidParameters(e.to_string()),
        other => ToolError::ExecutionFailed(other.to_string()),
    }
}

/// Successful result for a page update.
pub(crate) fn update_result(update: &PageUpdate) -> ToolResult {
    ToolResult::success(update.render())
        .with_structured_output(json!({
            "diff": update.diff,
            "settle": update.settle,
        }))
        .with_metadata("url", json!(update.manifest.url))
        .with_metadata("elements", json!(update.manifest.len()))
}
