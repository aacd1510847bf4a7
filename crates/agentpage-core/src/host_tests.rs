use super::*;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use agentpage_protocols::tool::Tool;
use agentpage_protocols::types::Version;

struct PingTool {
    definition: ToolDefinition,
}

#[async_trait]
impl Tool for PingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success("pong"))
    }
}

struct PingExtension {
    manifest: ExtensionManifest,
    shutdowns: Arc<AtomicUsize>,
}

impl PingExtension {
    fn new(id: &str, shutdowns: Arc<AtomicUsize>) -> Self {
        let manifest = ExtensionManifest::new(id, "Ping", Version::new(0, 1, 0))
            .with_tools([format!("{}_ping", id)]);
        Self { manifest, shutdowns }
    }
}

#[async_trait]
impl Extension for PingExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        let id = format!("{}_ping", self.manifest.id);
        ctx.tool_registry.register_tool(Arc::new(PingTool {
            definition: ToolDefinition::new(id.clone(), id, "Replies pong"),
        }))
    }

    async fn shutdown(&self) -> Result<(), ExtensionError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[tokio::test]
async fn test_load_registers_tools() {
    let host = Host::new(PathBuf::from("/tmp"));
    let counter = Arc::new(AtomicUsize::new(0));
    host.load_extension(Box::new(PingExtension::new("a", counter)), serde_json::json!({}))
        .await
        .unwrap();

    assert_eq!(host.list_extensions().len(), 1);
    assert_eq!(host.list_tools()[0].id, "a_ping");

    let result = host
        .call_tool("a_ping", serde_json::json!({}), host.tool_context("test"))
        .await
        .unwrap();
    assert_eq!(result.content, "pong");
}

#[tokio::test]
async fn test_load_duplicate_extension_fails() {
    let host = Host::new(PathBuf::from("/tmp"));
    let counter = Arc::new(AtomicUsize::new(0));
    host.load_extension(Box::new(PingExtension::new("a", counter.clone())), serde_json::json!({}))
        .await
        .unwrap();
    let err = host
        .load_extension(Box::new(PingExtension::new("a", counter)), serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtensionError::AlreadyRegistered(_)));
}

#[tokio::test]
async fn test_shutdown_unloads_everything() {
    let host = Host::new(PathBuf::from("/tmp"));
    let counter = Arc::new(AtomicUsize::new(0));
    for id in ["a", "b"] {
        host.load_extension(Box::new(PingExtension::new(id, counter.clone())), serde_json::json!({}))
            .await
            .unwrap();
    }
    host.shutdown().await;

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert!(host.list_extensions().is_empty());
    assert!(host.list_tools().is_empty());
}

#[tokio::test]
async fn test_call_unknown_tool() {
    let host = Host::new(PathBuf::from("/tmp"));
    let err = host
        .call_tool("nope", serde_json::json!({}), host.tool_context("test"))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(_)));
}
