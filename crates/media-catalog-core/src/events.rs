use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;
use crate::canonical::CanonicalItem;

const EVENT_CAPACITY: usize = 64;

/// Change notifications raised after a store mutation has been committed.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    HistoryUpdated,
    WatchlistUpdated,
    ItemAddedToWatchlist(Arc<CanonicalItem>),
}

/// Fan-out of catalog events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: CatalogEvent) {
        trace!("Publishing {:?}", event);
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
