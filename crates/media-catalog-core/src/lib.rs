pub mod canonical;
pub mod catalog;
pub mod error;
pub mod events;
pub mod gateway;
pub mod history;
pub mod hydration;
pub mod identity_map;
pub mod item_cache;
pub mod persist;
pub mod playback;
pub mod watchlist;

#[cfg(test)]
mod test_support;

pub use canonical::{CanonicalItem, ItemView};
pub use catalog::{Catalog, CatalogOptions, SearchOutcome};
pub use error::{CatalogError, Result};
pub use events::{CatalogEvent, EventBus};
pub use gateway::{order_channel_matches, ProviderGateway, SearchSession};
pub use history::HistoryStore;
pub use hydration::Hydrator;
pub use identity_map::IdentityMap;
pub use item_cache::RawItemCache;
pub use playback::{Advance, ContinuousPlayback, EpisodeSource, PlaybackContext};
pub use watchlist::WatchlistStore;
