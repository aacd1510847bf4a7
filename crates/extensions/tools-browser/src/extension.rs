//! Browser tools extension.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use agentpage_config::{Config, SettleConfig, WalkerConfig};
use agentpage_protocols::error::ExtensionError;
use agentpage_protocols::extension::{Extension, ExtensionContext, ExtensionManifest};
use agentpage_protocols::tool::Tool;
use agentpage_protocols::types::Version;

use crate::manager::{BrowserManager, BrowserManagerConfig};
use crate::tools::*;

/// Tool ids this extension registers.
pub const TOOL_IDS: &[&str] = &[
    "browser_open",
    "browser_close",
    "browser_list_pages",
    "browser_navigate",
    "browser_execute_action",
    "browser_discover_actions",
    "browser_generate_page",
    "browser_remap_page",
    "browser_wait_for_changes",
];

/// Browser tools extension.
///
/// Chrome is launched on first use with a persistent profile at
/// `~/.agentpage/browser-profile`. Settlement and walker defaults can be
/// overridden through the `settle` and `walker` keys of the extension
/// config.
pub struct BrowserToolsExtension {
    manifest: ExtensionManifest,
    config: BrowserManagerConfig,
    manager: Option<Arc<BrowserManager>>,
}

impl BrowserToolsExtension {
    pub fn new() -> Self {
        Self::with_config(BrowserManagerConfig::default())
    }

    /// Build from a loaded configuration file.
    pub fn from_config(config: &Config) -> Self {
        Self::with_config(BrowserManagerConfig::from(config))
    }

    fn with_config(config: BrowserManagerConfig) -> Self {
        let manifest = ExtensionManifest::new("tools-browser", "Browser Tools", Version::new(0, 1, 0))
            .with_description(
                "Settlement-aware semantic page mapping over CDP; launches Chrome with a persistent profile",
            )
            .with_tools(TOOL_IDS.iter().copied());

        Self {
            manifest,
            config,
            manager: None,
        }
    }

    /// Set viewport size.
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    /// Set the Chrome debugging port.
    /// Default: 9222
    pub fn debug_port(mut self, port: u16) -> Self {
        self.config.debug_port = port;
        self
    }

    /// Set custom profile directory for persistent login state.
    /// Default: ~/.agentpage/browser-profile
    pub fn profile_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.profile_dir = Some(path.into());
        self
    }

    /// Enable headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Settlement defaults for every page.
    pub fn settle_defaults(mut self, settle: SettleConfig) -> Self {
        self.config.settle = settle;
        self
    }

    /// Walker limits for every page.
    pub fn walker_limits(mut self, walker: WalkerConfig) -> Self {
        self.config.walker = walker;
        self
    }

    /// Get the browser manager.
    pub fn manager(&self) -> Option<Arc<BrowserManager>> {
        self.manager.clone()
    }

    fn tools(manager: &Arc<BrowserManager>) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(OpenPageTool::new(manager.clone())),
            Arc::new(ClosePageTool::new(manager.clone())),
            Arc::new(ListPagesTool::new(manager.clone())),
            Arc::new(NavigateTool::new(manager.clone())),
            Arc::new(ExecuteActionTool::new(manager.clone())),
            Arc::new(DiscoverActionsTool::new(manager.clone())),
            Arc::new(GeneratePageTool::new(manager.clone())),
            Arc::new(RemapPageTool::new(manager.clone())),
            Arc::new(WaitForChangesTool::new(manager.clone())),
        ]
    }
}

impl Default for BrowserToolsExtension {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for BrowserToolsExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        if let Some(settle) = ctx.section::<SettleConfig>("settle")? {
            self.config.settle = settle;
        }
        if let Some(walker) = ctx.section::<WalkerConfig>("walker")? {
            self.config.walker = walker;
        }

        // Chrome is launched lazily by the first tool that needs a page.
        let manager = Arc::new(BrowserManager::new(self.config.clone()));
        let registered = ctx.register_tools(Self::tools(&manager))?;
        self.manager = Some(manager);

        info!(
            "Browser tools extension initialized ({} tools, profile: {}, port: {})",
            registered,
            self.config.get_profile_dir().display(),
            self.config.debug_port
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ExtensionError> {
        if let Some(ref manager) = self.manager {
            manager
                .shutdown_chrome()
                .await
                .map_err(|e| ExtensionError::ShutdownFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
