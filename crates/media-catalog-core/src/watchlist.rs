use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use crate::error::Result;
use crate::events::{CatalogEvent, EventBus};
use crate::identity_map::IdentityMap;
use crate::persist;

/// Persisted set of saved item ids.
///
/// Only calls that change membership write to disk or raise an event.
/// Attached live items have their watchlist flag updated before that event.
pub struct WatchlistStore {
    path: PathBuf,
    ids: Mutex<HashSet<String>>,
    write_gate: tokio::sync::Mutex<()>,
    events: EventBus,
    identity: Option<Arc<IdentityMap>>,
}

impl WatchlistStore {
    pub fn load(path: impl Into<PathBuf>, events: EventBus) -> Self {
        let path = path.into();
        let ids: HashSet<String> = persist::load_json::<Vec<String>>(&path, "watchlist")
            .unwrap_or_default()
            .into_iter()
            .collect();
        info!("Loaded {} watchlist entries from {:?}", ids.len(), path);

        Self {
            path,
            ids: Mutex::new(ids),
            write_gate: tokio::sync::Mutex::new(()),
            events,
            identity: None,
        }
    }

    /// Keep the watchlist flag of items in `identity` in step with the store.
    pub fn with_identity(mut self, identity: Arc<IdentityMap>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the id was not already on the watchlist.
    pub async fn add(&self, id: &str) -> Result<bool> {
        self.mutate(Some(id), |ids| ids.insert(id.to_string())).await
    }

    /// Returns true if the id was on the watchlist.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        self.mutate(Some(id), |ids| ids.remove(id)).await
    }

    pub async fn clear(&self) -> Result<bool> {
        self.mutate(None, |ids| {
            let changed = !ids.is_empty();
            ids.clear();
            changed
        })
        .await
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).contains(id)
    }

    pub fn get_all(&self) -> HashSet<String> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply `change` and, if membership moved, persist and announce it.
    /// `affected` names the one item whose flag can change; `None` means all.
    async fn mutate<F>(&self, affected: Option<&str>, change: F) -> Result<bool>
    where
        F: FnOnce(&mut HashSet<String>) -> bool,
    {
        let _gate = self.write_gate.lock().await;

        let snapshot = {
            let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
            if !change(&mut ids) {
                return Ok(false);
            }
            let mut snapshot: Vec<String> = ids.iter().cloned().collect();
            snapshot.sort();
            snapshot
        };

        debug!("Watchlist now has {} entries", snapshot.len());
        let bytes = persist::to_json(&snapshot, "watchlist")?;
        let persisted = persist::write_atomic(&self.path, bytes).await;
        if let Err(e) = &persisted {
            warn!("Failed to save watchlist: {}", e);
        }
        self.refresh_flags(affected, &snapshot);
        self.events.publish(CatalogEvent::WatchlistUpdated);
        persisted.map(|_| true)
    }

    fn refresh_flags(&self, affected: Option<&str>, snapshot: &[String]) {
        let Some(identity) = &self.identity else {
            return;
        };
        let items: Vec<_> = match affected {
            Some(id) => identity.try_get(id).into_iter().collect(),
            None => identity.items(),
        };
        for item in items {
            item.set_on_watchlist(snapshot.binary_search_by(|id| id.as_str().cmp(item.id())).is_ok());
        }
    }
}
