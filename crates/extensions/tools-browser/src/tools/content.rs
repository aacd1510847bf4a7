//! Page map tools: generate, remap, wait for changes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use agentpage_protocols::error::ToolError;
use agentpage_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use agentpage_protocols::types::PageEffect;

use crate::manager::BrowserManager;

use super::actions::{page_id_schema, PageParams};
use super::{agent_error, default_wait_timeout, get_page, timeout_from_ms, update_result};

// ============================================================================
// Generate Page Tool
// ============================================================================

/// Return the page map, from cache when the page was mapped already.
pub struct GeneratePageTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl GeneratePageTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_generate_page",
            "Browser Generate Page",
            "Return the page as a markdown outline with interactive elements marked by ID",
        )
        .with_effect(PageEffect::Observe)
        .with_parameters_schema(page_id_schema());
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for GeneratePageTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: PageParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let page = get_page(&self.manager, &params.page_id).await?;
        let manifest = page.generate_page().await.map_err(agent_error)?;
        Ok(ToolResult::success(manifest.content.clone())
            .with_metadata("url", json!(manifest.url))
            .with_metadata("elements", json!(manifest.len())))
    }
}

// ============================================================================
// Remap Page Tool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RemapPageParams {
    pub page_id: String,
    #[serde(default = "default_wait_timeout")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub wait_for_selector: Option<String>,
}

/// Re-scan the page and assign fresh IDs.
pub struct RemapPageTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl RemapPageTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_remap_page",
            "Browser Remap Page",
            "Re-scan the page and assign fresh element IDs, optionally waiting for a selector first",
        )
        .with_effect(PageEffect::Observe)
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "page_id": { "type": "string" },
                "timeout_ms": {
                    "type": "integer",
                    "description": "How long to wait for the selector (default 5000)"
                },
                "wait_for_selector": { "type": "string" }
            },
            "required": ["page_id"]
        }));
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for RemapPageTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: RemapPageParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let page = get_page(&self.manager, &params.page_id).await?;
        let update = page
            .remap_page(
                timeout_from_ms(params.timeout_ms),
                params.wait_for_selector.as_deref(),
            )
            .await
            .map_err(agent_error)?;
        Ok(update_result(&update))
    }
}

// ============================================================================
// Wait For Changes Tool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WaitForChangesParams {
    pub page_id: String,
    #[serde(default = "default_wait_timeout")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub wait_for_selector: Option<String>,
    #[serde(default)]
    pub wait_for_text: Option<String>,
}

/// Wait for the page to settle on its own, then remap it.
pub struct WaitForChangesTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl WaitForChangesTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_wait_for_changes",
            "Browser Wait For Changes",
            "Wait until the page stops changing (optionally until a selector or text appears), \
             then return the updated page map",
        )
        .with_effect(PageEffect::Observe)
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "page_id": { "type": "string" },
                "timeout_ms": {
                    "type": "integer",
                    "description": "Upper bound on the wait (default 5000)"
                },
                "wait_for_selector": { "type": "string" },
                "wait_for_text": { "type": "string" }
            },
            "required": ["page_id"]
        }));
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for WaitForChangesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: WaitForChangesParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let page = get_page(&self.manager, &params.page_id).await?;
        let update = page
            .wait_for_changes(
                timeout_from_ms(params.timeout_ms),
                params.wait_for_selector.as_deref(),
                params.wait_for_text.as_deref(),
            )
            .await
            .map_err(agent_error)?;
        Ok(update_result(&update))
    }
}
