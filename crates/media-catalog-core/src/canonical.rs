use media_catalog_models::{HistoryRecord, ItemRecord, ItemType};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use tracing::warn;

#[derive(Debug, Clone, Default)]
struct Overlay {
    history: Option<HistoryRecord>,
    is_on_watchlist: bool,
}

/// The single shared instance representing one item id.
///
/// Holders share it through `Arc`, so overlay changes and in-place record
/// refreshes are visible to every list that shows the item. Locks are only
/// held for the duration of a field copy.
#[derive(Debug)]
pub struct CanonicalItem {
    id: String,
    record: RwLock<ItemRecord>,
    overlay: RwLock<Overlay>,
}

/// Serializable snapshot of a canonical item with its overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub record: ItemRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryRecord>,
    pub is_on_watchlist: bool,
}

impl CanonicalItem {
    pub fn new(record: ItemRecord) -> Self {
        Self {
            id: record.id.clone(),
            record: RwLock::new(record),
            overlay: RwLock::new(Overlay::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> ItemRecord {
        self.record.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn source(&self) -> String {
        self.record.read().unwrap_or_else(PoisonError::into_inner).source.clone()
    }

    pub fn item_type(&self) -> ItemType {
        self.record.read().unwrap_or_else(PoisonError::into_inner).item_type
    }

    pub fn name(&self) -> String {
        self.record.read().unwrap_or_else(PoisonError::into_inner).name.clone()
    }

    /// Swap in newer data for the same id without changing identity.
    pub fn replace_record(&self, record: ItemRecord) {
        if record.id != self.id {
            warn!("Ignoring record {} offered for canonical item {}", record.id, self.id);
            return;
        }
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = record;
    }

    pub fn history(&self) -> Option<HistoryRecord> {
        self.overlay.read().unwrap_or_else(PoisonError::into_inner).history.clone()
    }

    pub fn set_history(&self, history: Option<HistoryRecord>) {
        self.overlay.write().unwrap_or_else(PoisonError::into_inner).history = history;
    }

    pub fn is_on_watchlist(&self) -> bool {
        self.overlay.read().unwrap_or_else(PoisonError::into_inner).is_on_watchlist
    }

    pub fn set_on_watchlist(&self, on_watchlist: bool) {
        self.overlay.write().unwrap_or_else(PoisonError::into_inner).is_on_watchlist = on_watchlist;
    }

    pub fn view(&self) -> ItemView {
        let overlay = self.overlay.read().unwrap_or_else(PoisonError::into_inner).clone();
        ItemView {
            record: self.record(),
            history: overlay.history,
            is_on_watchlist: overlay.is_on_watchlist,
        }
    }
}
