use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};
use crate::canonical::CanonicalItem;

/// In-memory map from item id to its canonical instance.
///
/// `get_or_create` runs the factory while holding the write lock, so an id can
/// never end up with two live canonical instances. The factory must not block.
#[derive(Debug, Default)]
pub struct IdentityMap {
    items: RwLock<HashMap<String, Arc<CanonicalItem>>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create<F>(&self, id: &str, factory: F) -> Arc<CanonicalItem>
    where
        F: FnOnce() -> CanonicalItem,
    {
        if let Some(existing) = self.try_get(id) {
            return existing;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have inserted it between the read and the write lock
        items
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!("Created canonical item {}", id);
                Arc::new(factory())
            })
            .clone()
    }

    pub fn try_get(&self, id: &str) -> Option<Arc<CanonicalItem>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Snapshot of every live canonical item.
    pub fn items(&self) -> Vec<Arc<CanonicalItem>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Evict every canonical item produced by `source`. Returns how many were removed.
    pub fn clear_source(&self, source: &str) -> usize {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|_, item| item.source() != source);
        let removed = before - items.len();
        info!("Evicted {} canonical items from source {}", removed, source);
        removed
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
