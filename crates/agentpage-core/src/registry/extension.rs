//! Registry of loaded extensions.

use std::sync::Arc;

use agentpage_protocols::error::ExtensionError;
use agentpage_protocols::extension::{Extension, ExtensionManifest};

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Extension {
    fn registry_id(&self) -> &str {
        &self.manifest().id
    }
}

/// Registry of initialized extensions.
#[derive(Default)]
pub struct ExtensionRegistry {
    inner: BaseRegistry<dyn Extension>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, extension: Arc<dyn Extension>) -> Result<(), ExtensionError> {
        self.inner.register(extension)
    }

    /// Remove an extension and hand it back so the caller can shut it down.
    pub fn unregister(&self, id: &str) -> Result<Arc<dyn Extension>, ExtensionError> {
        self.inner.unregister(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Extension>> {
        self.inner.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    /// Manifests of all loaded extensions, ordered by id.
    pub fn list(&self) -> Vec<ExtensionManifest> {
        self.inner
            .values()
            .iter()
            .map(|e| e.manifest().clone())
            .collect()
    }
}
