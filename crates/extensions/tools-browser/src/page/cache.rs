//! Latest-manifest cache.

use std::sync::Arc;

use parking_lot::RwLock;

use super::manifest::Manifest;

/// Holds the manifest of the most recent walk.
#[derive(Debug, Default)]
pub struct ManifestCache {
    current: RwLock<Option<Arc<Manifest>>>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Manifest>> {
        self.current.read().clone()
    }

    /// Swap in `manifest`, returning the one it supersedes.
    pub fn replace(&self, manifest: Manifest) -> (Arc<Manifest>, Option<Arc<Manifest>>) {
        let manifest = Arc::new(manifest);
        let previous = self.current.write().replace(manifest.clone());
        (manifest, previous)
    }

    pub fn invalidate(&self) {
        self.current.write().take();
    }
}
