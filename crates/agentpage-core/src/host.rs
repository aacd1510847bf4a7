//! Extension host: loads extensions and routes tool calls to them.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use agentpage_protocols::error::{ExtensionError, ToolError};
use agentpage_protocols::extension::{Extension, ExtensionContext, ExtensionManifest};
use agentpage_protocols::tool::{ToolContext, ToolDefinition, ToolResult};

use crate::registry::{ExtensionRegistry, ToolRegistry};

/// Owns the registries for one process.
pub struct Host {
    extensions: ExtensionRegistry,
    tools: Arc<ToolRegistry>,
    load_order: Mutex<Vec<String>>,
    work_dir: PathBuf,
}

impl Host {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            extensions: ExtensionRegistry::new(),
            tools: Arc::new(ToolRegistry::new()),
            load_order: Mutex::new(Vec::new()),
            work_dir,
        }
    }

    /// Initialize an extension and register it.
    pub async fn load_extension(
        &self,
        mut extension: Box<dyn Extension>,
        config: serde_json::Value,
    ) -> Result<(), ExtensionError> {
        let id = extension.manifest().id.clone();
        if self.extensions.contains(&id) {
            return Err(ExtensionError::AlreadyRegistered(id));
        }
        info!(
            "Loading extension: {} v{}",
            extension.manifest().name,
            extension.manifest().version
        );

        let ctx = ExtensionContext::new(config, self.tools.clone(), self.work_dir.clone());
        extension.initialize(ctx).await?;

        self.extensions.register(Arc::from(extension))?;
        self.load_order.lock().push(id.clone());
        info!("Extension loaded: {}", id);
        Ok(())
    }

    /// Shut down and remove an extension together with the tools it declared.
    pub async fn unload_extension(&self, id: &str) -> Result<(), ExtensionError> {
        let extension = self.extensions.unregister(id)?;
        for tool_id in &extension.manifest().tools {
            let _ = self.tools.unregister(tool_id);
        }
        self.load_order.lock().retain(|i| i != id);
        extension.shutdown().await
    }

    /// Unload every extension in reverse load order.
    pub async fn shutdown(&self) {
        let ids = self.load_order.lock().clone();
        for id in ids.into_iter().rev() {
            if let Err(e) = self.unload_extension(&id).await {
                warn!("Failed to unload {}: {}", id, e);
            }
        }
    }

    /// Run a tool by id.
    pub async fn call_tool(
        &self,
        id: &str,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        self.tools.invoke(id, params, ctx).await
    }

    /// Fresh tool context rooted at the host's work dir.
    pub fn tool_context(&self, session_id: &str) -> ToolContext {
        ToolContext::new(session_id, self.work_dir.clone())
    }

    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.list()
    }

    pub fn list_extensions(&self) -> Vec<ExtensionManifest> {
        self.extensions.list()
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
