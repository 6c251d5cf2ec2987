use media_catalog_models::ItemRecord;
use std::sync::Arc;
use crate::canonical::CanonicalItem;
use crate::history::HistoryStore;
use crate::identity_map::IdentityMap;
use crate::watchlist::WatchlistStore;

/// Routes provider records through the identity map and overlays user state.
#[derive(Clone)]
pub struct Hydrator {
    identity: Arc<IdentityMap>,
    history: Arc<HistoryStore>,
    watchlist: Arc<WatchlistStore>,
}

impl Hydrator {
    pub fn new(identity: Arc<IdentityMap>, history: Arc<HistoryStore>, watchlist: Arc<WatchlistStore>) -> Self {
        Self {
            identity,
            history,
            watchlist,
        }
    }

    /// Unify and hydrate a batch, keeping input order.
    pub fn unify(&self, records: Vec<ItemRecord>) -> Vec<Arc<CanonicalItem>> {
        records.into_iter().map(|record| self.unify_one(record)).collect()
    }

    /// Map a fresh record onto its canonical instance.
    ///
    /// A known id gets the fresh data swapped in place. Records without an id
    /// are wrapped but neither cached nor hydrated.
    pub fn unify_one(&self, record: ItemRecord) -> Arc<CanonicalItem> {
        if !record.has_id() {
            return Arc::new(CanonicalItem::new(record));
        }

        let id = record.id.clone();
        let mut fresh = Some(record);
        let canonical = self
            .identity
            .get_or_create(&id, || CanonicalItem::new(fresh.take().unwrap_or_default()));
        if let Some(record) = fresh {
            canonical.replace_record(record);
        }

        self.overlay(&canonical);
        canonical
    }

    /// Refresh history and watchlist state on an item.
    pub fn overlay(&self, item: &CanonicalItem) {
        item.set_history(self.history.get_progress(item.id()));
        item.set_on_watchlist(self.watchlist.contains(item.id()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use media_catalog_models::ItemType;

    struct Fixture {
        _dir: tempfile::TempDir,
        hydrator: Hydrator,
        history: Arc<HistoryStore>,
        watchlist: Arc<WatchlistStore>,
        identity: Arc<IdentityMap>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let events = EventBus::new();
        let identity = Arc::new(IdentityMap::new());
        let history = Arc::new(HistoryStore::load(dir.path().join("history.json"), events.clone()));
        let watchlist = Arc::new(WatchlistStore::load(dir.path().join("watchlist.json"), events));
        Fixture {
            hydrator: Hydrator::new(identity.clone(), history.clone(), watchlist.clone()),
            _dir: dir,
            history,
            watchlist,
            identity,
        }
    }

    fn record(id: &str, name: &str) -> ItemRecord {
        ItemRecord::new(id, name, ItemType::Video).with_source("library")
    }

    #[tokio::test]
    async fn test_same_id_from_two_listings_is_one_instance() {
        let f = fixture();
        let home = f.hydrator.unify(vec![record("ep1", "Episode 1"), record("ep2", "Episode 2")]);
        let search = f.hydrator.unify(vec![record("ep3", "Episode 3"), record("ep1", "Episode 1")]);

        assert!(Arc::ptr_eq(&home[0], &search[1]));
        assert_eq!(f.identity.len(), 3);

        // Progress recorded against one list is visible through the other
        let progress = f.history.upsert("ep1", 120.0, 1800.0).await.unwrap();
        home[0].set_history(Some(progress));
        assert_eq!(search[1].history().unwrap().last_position(), 120.0);
    }

    #[tokio::test]
    async fn test_overlay_reflects_stores() {
        let f = fixture();
        f.history.upsert("ep1", 1790.0, 1800.0).await.unwrap();
        f.watchlist.add("ep2").await.unwrap();

        let items = f.hydrator.unify(vec![record("ep1", "Episode 1"), record("ep2", "Episode 2")]);
        assert!(items[0].history().unwrap().is_finished());
        assert!(!items[0].is_on_watchlist());
        assert!(items[1].history().is_none());
        assert!(items[1].is_on_watchlist());
    }

    #[test]
    fn test_items_without_id_pass_through() {
        let f = fixture();
        let items = f.hydrator.unify(vec![record("", "Loose"), record("ep1", "Episode 1"), record("", "Loose")]);

        let names: Vec<_> = items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Loose", "Episode 1", "Loose"]);
        assert!(!Arc::ptr_eq(&items[0], &items[2]));
        assert_eq!(f.identity.len(), 1);
    }

    #[test]
    fn test_fresh_data_updates_in_place() {
        let f = fixture();
        let first = f.hydrator.unify_one(record("ep1", "Old"));
        let second = f.hydrator.unify_one(record("ep1", "New"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "New");
    }
}
