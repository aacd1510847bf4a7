//! Generic id-keyed registry shared by the tool and extension registries.

use dashmap::DashMap;
use std::sync::Arc;

use agentpage_protocols::error::ExtensionError;

/// Items that can be stored in a [`BaseRegistry`].
pub trait Registerable: Send + Sync {
    /// Unique identifier of the item.
    fn registry_id(&self) -> &str;
}

/// Concurrent registry of shared items keyed by their id.
pub struct BaseRegistry<T: ?Sized + Registerable> {
    items: DashMap<String, Arc<T>>,
}

impl<T: ?Sized + Registerable> BaseRegistry<T> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Register an item. Fails if the id is taken.
    pub fn register(&self, item: Arc<T>) -> Result<(), ExtensionError> {
        let id = item.registry_id().to_string();
        match self.items.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(e) => {
                Err(ExtensionError::AlreadyRegistered(e.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(item);
                Ok(())
            }
        }
    }

    /// Remove an item, returning it.
    pub fn unregister(&self, id: &str) -> Result<Arc<T>, ExtensionError> {
        self.items
            .remove(id)
            .map(|(_, item)| item)
            .ok_or_else(|| ExtensionError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.items.get(id).map(|item| item.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Registered ids in ascending order.
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.items.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot of all items ordered by id.
    pub fn values(&self) -> Vec<Arc<T>> {
        let mut entries: Vec<(String, Arc<T>)> = self
            .items
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, item)| item).collect()
    }
}

impl<T: ?Sized + Registerable> Default for BaseRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
