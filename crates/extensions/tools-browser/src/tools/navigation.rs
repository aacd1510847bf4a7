//! Navigation tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use agentpage_protocols::error::ToolError;
use agentpage_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use agentpage_protocols::types::PageEffect;

use crate::manager::BrowserManager;

use super::{agent_error, get_page, update_result};

// ============================================================================
// Navigate Tool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NavigateParams {
    pub page_id: String,
    pub url: String,
}

/// Navigate a page, wait for it to settle and map it.
pub struct NavigateTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl NavigateTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_navigate",
            "Browser Navigate",
            "Navigate a browser page to a URL and return the page map with element IDs",
        )
        .with_effect(PageEffect::Navigate)
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "page_id": { "type": "string" },
                "url": {
                    "type": "string",
                    "description": "Absolute http(s), file, about or data URL"
                }
            },
            "required": ["page_id", "url"]
        }));
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for NavigateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: NavigateParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let page = get_page(&self.manager, &params.page_id).await?;
        let navigation = page.navigate(&params.url).await.map_err(agent_error)?;

        match navigation.outcome {
            Ok(()) => {
                debug!("Navigated {} to {}", params.page_id, params.url);
                Ok(update_result(&navigation.update))
            }
            Err(e) => {
                let update = &navigation.update;
                Ok(ToolResult::error_with_content(
                    format!("Navigation to {} failed: {}", params.url, e),
                    update.render(),
                )
                .with_structured_output(json!({
                    "diff": update.diff,
                    "settle": update.settle,
                }))
                .with_metadata("url", json!(update.manifest.url)))
            }
        }
    }
}
