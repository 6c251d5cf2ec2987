use async_trait::async_trait;
use media_catalog_config::{Config, PathManager};
use media_catalog_models::{HistoryRecord, ItemRecord};
use media_catalog_sources::CatalogProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::canonical::CanonicalItem;
use crate::error::Result;
use crate::events::{CatalogEvent, EventBus};
use crate::gateway::{ProviderGateway, SearchSession};
use crate::history::HistoryStore;
use crate::hydration::Hydrator;
use crate::identity_map::IdentityMap;
use crate::item_cache::RawItemCache;
use crate::playback::EpisodeSource;
use crate::watchlist::WatchlistStore;

/// Where the catalog keeps its persisted stores.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub history_path: PathBuf,
    pub watchlist_path: PathBuf,
    pub item_cache_path: PathBuf,
    pub debounce: Duration,
}

impl CatalogOptions {
    pub fn from_config(config: &Config, paths: &PathManager) -> Self {
        Self {
            history_path: paths.data_file(&config.cache.history_file),
            watchlist_path: paths.data_file(&config.cache.watchlist_file),
            item_cache_path: paths.data_file(&config.cache.item_cache_file),
            debounce: Duration::from_millis(config.cache.debounce_ms),
        }
    }

    /// Default file names under one directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            history_path: dir.join("history.json"),
            watchlist_path: dir.join("watchlist.json"),
            item_cache_path: dir.join("item_cache.json"),
            debounce: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
pub enum SearchOutcome {
    Completed(Vec<Arc<CanonicalItem>>),
    /// A newer search started (or the caller cancelled) before this one finished.
    Cancelled,
}

/// Facade over providers, caches and user state.
///
/// Every item handed out is the canonical instance for its id.
pub struct Catalog {
    gateway: Arc<ProviderGateway>,
    identity: Arc<IdentityMap>,
    item_cache: Arc<RawItemCache>,
    history: Arc<HistoryStore>,
    watchlist: Arc<WatchlistStore>,
    hydrator: Hydrator,
    searches: SearchSession,
    events: EventBus,
}

impl Catalog {
    /// Open the persisted stores and wire up the providers. Must be called inside a Tokio runtime.
    pub fn open(providers: Vec<Arc<dyn CatalogProvider>>, options: &CatalogOptions) -> Self {
        let events = EventBus::new();
        let identity = Arc::new(IdentityMap::new());
        let history = Arc::new(HistoryStore::load(&options.history_path, events.clone()).with_identity(identity.clone()));
        let watchlist =
            Arc::new(WatchlistStore::load(&options.watchlist_path, events.clone()).with_identity(identity.clone()));
        let item_cache = Arc::new(RawItemCache::load(&options.item_cache_path, options.debounce));
        let gateway = Arc::new(ProviderGateway::new(providers));
        info!("Catalog ready with providers: {:?}", gateway.provider_names());

        Self {
            hydrator: Hydrator::new(identity.clone(), history.clone(), watchlist.clone()),
            gateway,
            identity,
            item_cache,
            history,
            watchlist,
            searches: SearchSession::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn get_listing(&self) -> Vec<Arc<CanonicalItem>> {
        let records = self.gateway.listing().await;
        self.item_cache.put_all(records.iter().cloned());
        self.hydrator.unify(records)
    }

    pub async fn get_children(&self, parent_id: &str) -> Vec<Arc<CanonicalItem>> {
        let records = self.gateway.children(parent_id).await;
        self.item_cache.put_all(records.iter().cloned());
        self.hydrator.unify(records)
    }

    /// Cancel whatever search is in flight and return a token for a new one.
    pub fn begin_search(&self) -> CancellationToken {
        self.searches.begin()
    }

    pub async fn search(&self, query: &str, cancel: &CancellationToken) -> SearchOutcome {
        match self.gateway.search(query, cancel).await {
            Some(records) if !cancel.is_cancelled() => SearchOutcome::Completed(self.hydrator.unify(records)),
            _ => SearchOutcome::Cancelled,
        }
    }

    /// Look up one item: identity map, then the item cache (refreshed in the
    /// background), then the providers.
    pub async fn get_item(&self, id: &str) -> Option<Arc<CanonicalItem>> {
        if id.trim().is_empty() {
            return None;
        }

        if let Some(item) = self.identity.try_get(id) {
            self.hydrator.overlay(&item);
            return Some(item);
        }

        if let Some(record) = self.item_cache.try_get(id) {
            debug!("Serving {} from item cache, refreshing in background", id);
            let item = self.hydrator.unify_one(record);
            self.refresh_in_background(id);
            return Some(item);
        }

        let record = self.gateway.item(id).await?;
        self.item_cache.put(record.clone());
        Some(self.hydrator.unify_one(record))
    }

    fn refresh_in_background(&self, id: &str) {
        let id = id.to_string();
        let gateway = self.gateway.clone();
        let identity = self.identity.clone();
        let item_cache = self.item_cache.clone();

        tokio::spawn(async move {
            match gateway.item(&id).await {
                Some(record) => {
                    if let Some(item) = identity.try_get(&id) {
                        item.replace_record(record.clone());
                    }
                    item_cache.put(record);
                    debug!("Background refresh of {} complete", id);
                }
                None => debug!("Background refresh of {}: no provider answered", id),
            }
        });
    }

    /// Record progress. Live items already carry it when `HistoryUpdated` arrives.
    pub async fn upsert_history(&self, id: &str, position: f64, duration: f64) -> Result<HistoryRecord> {
        self.history.upsert(id, position, duration).await
    }

    pub fn get_history(&self, id: &str) -> Option<HistoryRecord> {
        self.history.get_progress(id)
    }

    pub fn get_all_history(&self) -> Vec<HistoryRecord> {
        self.history.get_all()
    }

    /// Items with recorded progress, most recent first. Unresolvable ids are skipped.
    pub async fn continue_watching(&self) -> Vec<Arc<CanonicalItem>> {
        let mut items = Vec::new();
        for record in self.history.get_all() {
            if let Some(item) = self.get_item(record.id()).await {
                items.push(item);
            }
        }
        items
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.history.clear().await
    }

    pub async fn add_to_watchlist(&self, item: &Arc<CanonicalItem>) -> Result<()> {
        // The store only flags items it can find in the identity map
        item.set_on_watchlist(true);
        let added = self.watchlist.add(item.id()).await;
        if matches!(added, Ok(true)) {
            self.events.publish(CatalogEvent::ItemAddedToWatchlist(item.clone()));
        }
        added.map(|_| ())
    }

    pub async fn remove_from_watchlist(&self, id: &str) -> Result<bool> {
        self.watchlist.remove(id).await
    }

    pub fn is_on_watchlist(&self, id: &str) -> bool {
        self.watchlist.contains(id)
    }

    /// Watchlist entries resolved to items. Unresolvable ids are skipped.
    pub async fn get_watchlist_items(&self) -> Vec<Arc<CanonicalItem>> {
        let mut ids: Vec<String> = self.watchlist.get_all().into_iter().collect();
        ids.sort();
        let mut items = Vec::new();
        for id in ids {
            if let Some(item) = self.get_item(&id).await {
                items.push(item);
            }
        }
        items
    }

    pub async fn clear_watchlist(&self) -> Result<bool> {
        self.watchlist.clear().await
    }

    /// Forget the canonical items of one provider so its next listing starts fresh.
    pub fn clear_source(&self, source: &str) -> usize {
        self.identity.clear_source(source)
    }

    pub async fn clear_item_cache(&self) -> Result<()> {
        self.item_cache.clear();
        self.item_cache.flush().await
    }

    /// Flush pending cache writes and stop the writer.
    pub async fn shutdown(&self) {
        self.searches.cancel();
        self.item_cache.shutdown().await;
    }
}

#[async_trait]
impl EpisodeSource for Catalog {
    async fn episodes(&self, container_id: &str) -> Vec<ItemRecord> {
        self.get_children(container_id)
            .await
            .iter()
            .map(|item| item.record())
            .collect()
    }
}
