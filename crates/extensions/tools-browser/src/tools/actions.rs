//! Element tools: execute an action by semantic ID, list actionable elements.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use agentpage_protocols::error::ToolError;
use agentpage_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use agentpage_protocols::types::PageEffect;

use crate::dispatch::ActionParams;
use crate::manager::BrowserManager;

use super::{agent_error, default_true, get_page};

// ============================================================================
// Execute Action Tool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ExecuteActionParams {
    pub page_id: String,
    /// Semantic element ID from the page map.
    pub id: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default = "default_true")]
    pub wait_for_changes: bool,
}

/// Perform the action behind a semantic element ID.
pub struct ExecuteActionTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl ExecuteActionTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_execute_action",
            "Browser Execute Action",
            "Act on an element by its ID from the page map: fill/select/adjust/edit take a value, \
             toggle takes an optional boolean, everything else is clicked. Waits for the page to \
             settle and returns the updated page map.",
        )
        .with_effect(PageEffect::Interact)
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "page_id": { "type": "string" },
                "id": {
                    "type": "string",
                    "description": "Element ID shown as (ID: ...) in the page map"
                },
                "value": {
                    "description": "Text to fill/select/edit, or true/false to force a checkbox state"
                },
                "wait_for_changes": {
                    "type": "boolean",
                    "description": "Wait for the page to settle after the action (default true)"
                }
            },
            "required": ["page_id", "id"]
        }));
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for ExecuteActionTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: ExecuteActionParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let page = get_page(&self.manager, &params.page_id).await?;
        let action = ActionParams { value: params.value };
        let report = page
            .execute_action(&params.id, action, params.wait_for_changes)
            .await
            .map_err(agent_error)?;

        let structured = json!({
            "diff": report.update.diff,
            "settle": report.update.settle,
        });
        match report.outcome {
            Ok(outcome) => {
                debug!("{} on {}", outcome.summary(), params.page_id);
                Ok(ToolResult::success(format!(
                    "{}\n\n{}",
                    outcome.summary(),
                    report.update.render()
                ))
                .with_structured_output(structured)
                .with_metadata("action", json!(outcome)))
            }
            Err(e) => Ok(ToolResult::error_with_content(e.to_string(), report.update.render())
                .with_structured_output(structured)
                .with_metadata("error_kind", json!(e.kind()))),
        }
    }
}

// ============================================================================
// Discover Actions Tool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page_id: String,
}

/// List the interactive elements of a page with their IDs.
pub struct DiscoverActionsTool {
    definition: ToolDefinition,
    manager: Arc<BrowserManager>,
}

impl DiscoverActionsTool {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        let definition = ToolDefinition::new(
            "browser_discover_actions",
            "Browser Discover Actions",
            "List every interactive element of the current page map with its ID, action and label \
             (browser_remap_page re-scans the page)",
        )
        .with_effect(PageEffect::Observe)
        .with_parameters_schema(page_id_schema());
        Self { definition, manager }
    }
}

#[async_trait]
impl Tool for DiscoverActionsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let params: PageParams = serde_json::from_value(params)
            .map_err(ToolError::invalid_params)?;

        let page = get_page(&self.manager, &params.page_id).await?;
        let elements = page.discover_actions().await.map_err(agent_error)?;

        let lines: Vec<String> = elements
            .iter()
            .map(|el| {
                let mut line = format!("- {} [{}]", el.id, el.action_kind);
                if !el.label.is_empty() {
                    line.push_str(&format!(" {}", el.label));
                }
                if let Some(options) = &el.options {
                    line.push_str(&format!(" Options: {}", options.join(", ")));
                }
                line
            })
            .collect();
        let content = if lines.is_empty() {
            "No interactive elements".to_string()
        } else {
            format!("{} interactive elements:\n{}", lines.len(), lines.join("\n"))
        };
        let output = serde_json::to_value(&elements)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::success_json(content, output))
    }
}

pub(crate) fn page_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "page_id": { "type": "string" }
        },
        "required": ["page_id"]
    })
}
