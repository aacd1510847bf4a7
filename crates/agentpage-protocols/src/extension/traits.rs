//! Extension trait definition.

use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

use super::{ExtensionContext, ExtensionManifest};
use crate::error::ExtensionError;
use crate::tool::Tool;

/// A bundle of tools sharing one long-lived resource.
///
/// The host calls `initialize` once, where the extension registers its
/// tools, and `shutdown` when it unloads the extension.
#[async_trait]
pub trait Extension: Send + Sync + 'static {
    fn manifest(&self) -> &ExtensionManifest;

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError>;

    /// Release the resource. Tools are unregistered by the host.
    async fn shutdown(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// For downcasting to the concrete extension.
    fn as_any(&self) -> &dyn Any;
}

/// Registration surface handed to extensions.
pub trait ToolRegistryAccess: Send + Sync {
    fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<(), ExtensionError>;

    fn unregister_tool(&self, tool_id: &str) -> Result<(), ExtensionError>;
}
