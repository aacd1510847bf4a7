//! Tool registry and call routing.

use std::sync::Arc;

use tracing::{debug, Instrument};

use agentpage_protocols::error::{ExtensionError, ToolError};
use agentpage_protocols::extension::ToolRegistryAccess;
use agentpage_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Tool {
    fn registry_id(&self) -> &str {
        &self.definition().id
    }
}

/// Registry of the tools exposed to the controller.
pub struct ToolRegistry {
    inner: BaseRegistry<dyn Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), ExtensionError> {
        self.inner.register(tool)
    }

    pub fn unregister(&self, id: &str) -> Result<(), ExtensionError> {
        self.inner.unregister(id).map(|_| ())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.inner.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All tool definitions, ordered by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.inner
            .values()
            .iter()
            .map(|t| t.definition().clone())
            .collect()
    }

    /// Look up a tool, validate the parameters and run it.
    pub async fn invoke(
        &self,
        id: &str,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(id)
            .ok_or_else(|| ToolError::NotFound(id.to_string()))?;
        if ctx.is_cancelled() {
            return Err(ToolError::Cancelled);
        }
        tool.validate(&params)?;

        let span = ctx.span(id);
        async move {
            debug!("Invoking tool");
            let result = tool.execute(params, ctx).await;
            match &result {
                Ok(r) => debug!(success = r.success, "Tool finished"),
                Err(e) => debug!(error = %e, "Tool failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistryAccess for ToolRegistry {
    fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<(), ExtensionError> {
        self.register(tool)
    }

    fn unregister_tool(&self, tool_id: &str) -> Result<(), ExtensionError> {
        self.unregister(tool_id)
    }
}
