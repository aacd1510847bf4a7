//! Extension initialization context.

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ToolRegistryAccess;
use crate::error::ExtensionError;
use crate::tool::Tool;

/// What an extension gets when it is loaded.
#[derive(Clone)]
pub struct ExtensionContext {
    /// Extension-specific settings, a JSON object keyed by section.
    pub config: Value,

    pub tool_registry: Arc<dyn ToolRegistryAccess>,

    pub work_dir: PathBuf,
}

impl ExtensionContext {
    pub fn new(config: Value, tool_registry: Arc<dyn ToolRegistryAccess>, work_dir: PathBuf) -> Self {
        Self {
            config,
            tool_registry,
            work_dir,
        }
    }

    /// Decode the config section `key`.
    ///
    /// A missing or null section is `Ok(None)`; a present one that does not
    /// decode is an error rather than being silently ignored.
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ExtensionError> {
        match self.config.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| ExtensionError::InvalidConfig {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    /// Register every tool, stopping at the first id clash.
    pub fn register_tools(
        &self,
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> Result<usize, ExtensionError> {
        let mut count = 0;
        for tool in tools {
            self.tool_registry.register_tool(tool)?;
            count += 1;
        }
        Ok(count)
    }
}
