//! Page lifecycle tools: open, close, list.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use agentpage_protocols::error::ToolError;
use agentpage_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use agentpage_protocols::types::PageEffect;

use crate::manager::BrowserManager;

use super::browser_error;

// ============================================================================
// Open Page Tool (creates new page and triggers lazy browser init)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenPageParams {
    #[serde(default)]
    pub url: Option<String>,
}

/// Open a new browser page.
///
/// Chrome is launched or connected on first use. With a URL the page is
/// navigated, settled and mapped before the tool returns.
pub struct OpenPageTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl OpenPageTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_open",
            "Browser Open",
            "Open a new browser page, optionally navigating to a URL. Returns page_id and the page map.",
        )
        .with_effect(PageEffect::Navigate)
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to navigate to"
                }
            }
        }));
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for OpenPageTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: OpenPageParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let (page_id, update) = self
            .manager
            .open_page(params.url.as_deref())
            .await
            .map_err(browser_error)?;
        debug!("Opened page {}", page_id);

        let content = match &update {
            Some(update) => format!("Opened {}\n\n{}", page_id, update.render()),
            None => format!("Opened {} (blank)", page_id),
        };
        Ok(ToolResult::success(content)
            .with_structured_output(json!({ "page_id": page_id }))
            .with_metadata("page_id", json!(page_id)))
    }
}

// ============================================================================
// Close Page Tool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClosePageParams {
    pub page_id: String,
}

/// Close a browser page.
pub struct ClosePageTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl ClosePageTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new("browser_close", "Browser Close", "Close a browser page")
            .with_effect(PageEffect::Navigate)
            .with_parameters_schema(json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string" }
                },
                "required": ["page_id"]
            }));
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for ClosePageTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: ClosePageParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        self.manager
            .close_page(&params.page_id)
            .await
            .map_err(browser_error)?;

        debug!("Closed page {}", params.page_id);
        Ok(ToolResult::success(format!("Closed page {}", params.page_id)))
    }
}

// ============================================================================
// List Pages Tool
// ============================================================================

/// List open browser pages.
pub struct ListPagesTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl ListPagesTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "browser_list_pages",
                "Browser List Pages",
                "List all open browser pages",
            )
            .with_effect(PageEffect::Observe),
            manager,
        }
    }
}

#[async_trait]
impl Tool for ListPagesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let pages = self.manager.list_pages().await;
        if pages.is_empty() {
            return Ok(ToolResult::success_json("No open pages", json!([])));
        }

        let lines: Vec<String> = pages
            .iter()
            .map(|p| match (&p.url, &p.title) {
                (Some(url), Some(title)) if !title.is_empty() => {
                    format!("- {}: {} ({}, {} elements)", p.page_id, title, url, p.elements)
                }
                (Some(url), _) => format!("- {}: {} ({} elements)", p.page_id, url, p.elements),
                _ => format!("- {}: not mapped yet", p.page_id),
            })
            .collect();
        let output = serde_json::to_value(&pages)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::success_json(lines.join("\n"), output))
    }
}
