use chrono::Utc;
use media_catalog_models::HistoryRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use crate::error::Result;
use crate::events::{CatalogEvent, EventBus};
use crate::identity_map::IdentityMap;
use crate::persist;

/// Persisted per-item watch progress.
///
/// Every mutation rewrites the whole document. Writers queue on `write_gate`
/// so snapshots reach disk in the order they were taken; the record map lock
/// is never held across the write.
///
/// When attached to an [`IdentityMap`], live canonical items carry the new
/// progress before `HistoryUpdated` goes out.
pub struct HistoryStore {
    path: PathBuf,
    records: Mutex<HashMap<String, HistoryRecord>>,
    write_gate: tokio::sync::Mutex<()>,
    events: EventBus,
    identity: Option<Arc<IdentityMap>>,
}

impl HistoryStore {
    /// Load the store from disk. A missing or corrupt file yields an empty store.
    pub fn load(path: impl Into<PathBuf>, events: EventBus) -> Self {
        let path = path.into();
        let records: HashMap<String, HistoryRecord> = persist::load_json::<Vec<HistoryRecord>>(&path, "history")
            .unwrap_or_default()
            .into_iter()
            .map(|record| (record.id().to_string(), record.normalized()))
            .collect();
        info!("Loaded {} history records from {:?}", records.len(), path);

        Self {
            path,
            records: Mutex::new(records),
            write_gate: tokio::sync::Mutex::new(()),
            events,
            identity: None,
        }
    }

    /// Keep the history overlay of items in `identity` in step with the store.
    pub fn with_identity(mut self, identity: Arc<IdentityMap>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record playback progress for `id`, creating the record on first use.
    pub async fn upsert(&self, id: &str, position: f64, duration: f64) -> Result<HistoryRecord> {
        let _gate = self.write_gate.lock().await;

        let (record, snapshot) = {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Utc::now();
            let record = records
                .entry(id.to_string())
                .and_modify(|r| r.record_progress(position, duration, now))
                .or_insert_with(|| HistoryRecord::new(id, position, duration, now))
                .clone();
            (record, Self::snapshot(&records))
        };

        debug!(
            "History {}: {:.0}s of {:.0}s (finished: {})",
            id,
            position,
            duration,
            record.is_finished()
        );
        let persisted = self.persist(snapshot).await;
        if let Some(item) = self.identity.as_ref().and_then(|identity| identity.try_get(id)) {
            item.set_history(Some(record.clone()));
        }
        self.events.publish(CatalogEvent::HistoryUpdated);
        persisted.map(|_| record)
    }

    pub fn get_progress(&self, id: &str) -> Option<HistoryRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// All records, most recently watched first
    pub fn get_all(&self) -> Vec<HistoryRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Self::snapshot(&records)
    }

    /// Forget all progress.
    pub async fn clear(&self) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
        let persisted = self.persist(Vec::new()).await;
        if let Some(identity) = &self.identity {
            for item in identity.items() {
                item.set_history(None);
            }
        }
        self.events.publish(CatalogEvent::HistoryUpdated);
        persisted
    }

    fn snapshot(records: &HashMap<String, HistoryRecord>) -> Vec<HistoryRecord> {
        let mut all: Vec<HistoryRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.last_watched().cmp(&a.last_watched()).then_with(|| a.id().cmp(b.id())));
        all
    }

    async fn persist(&self, snapshot: Vec<HistoryRecord>) -> Result<()> {
        let bytes = persist::to_json(&snapshot, "history")?;
        if let Err(e) = persist::write_atomic(&self.path, bytes).await {
            warn!("Failed to save history: {}", e);
            return Err(e);
        }
        Ok(())
    }
}
