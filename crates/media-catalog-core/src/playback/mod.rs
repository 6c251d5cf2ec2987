//! Decides what plays next when a stream ends.
//!
//! Within an opened container the next episode in its list plays; after the
//! last one the engine looks for season `N+1` of the same show using the
//! `showId|N` id convention. Anything else ends playback.

mod season;

pub use season::{next_season_id, parse_season_id, season_id, SEASON_SEPARATOR};

use async_trait::async_trait;
use media_catalog_models::{ItemRecord, ItemType};
use std::sync::Arc;
use tracing::debug;

/// Where season children come from when advancing past the end of a list.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn episodes(&self, container_id: &str) -> Vec<ItemRecord>;
}

/// Episodic state for the item that is playing. Not persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackContext {
    pub current_episode_list: Vec<ItemRecord>,
    pub current_show_id: Option<String>,
    pub current_season_id: Option<String>,
}

impl PlaybackContext {
    /// Context for playing from `container_id`, keeping only playable children.
    pub fn from_container(container_id: &str, children: Vec<ItemRecord>) -> Self {
        let show_id = match parse_season_id(container_id) {
            Some((show_id, _)) => show_id,
            None => container_id,
        };

        Self {
            current_episode_list: playable(children),
            current_show_id: Some(show_id.to_string()),
            current_season_id: Some(container_id.to_string()),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.current_episode_list.is_empty() || self.current_season_id.is_some()
    }

    fn next_after(&self, id: &str) -> Option<&ItemRecord> {
        let position = self.current_episode_list.iter().position(|e| e.id == id)?;
        self.current_episode_list.get(position + 1)
    }
}

/// Outcome of a stream ending.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Play(ItemRecord),
    /// Nothing follows; hand control back to navigation.
    Exit,
}

pub struct ContinuousPlayback {
    source: Arc<dyn EpisodeSource>,
    context: PlaybackContext,
    active: Option<ItemRecord>,
}

impl ContinuousPlayback {
    pub fn new(source: Arc<dyn EpisodeSource>) -> Self {
        Self {
            source,
            context: PlaybackContext::default(),
            active: None,
        }
    }

    /// Resume with a known context and the item currently playing.
    pub fn with_context(mut self, context: PlaybackContext, active: ItemRecord) -> Self {
        self.context = context;
        self.active = Some(active);
        self
    }

    pub fn context(&self) -> &PlaybackContext {
        &self.context
    }

    pub fn active(&self) -> Option<&ItemRecord> {
        self.active.as_ref()
    }

    /// Opening a container for browsing only matters for brands, which reset episodic state.
    pub fn open_container(&mut self, container: &ItemRecord) {
        if container.item_type == ItemType::Brand {
            debug!("Opened brand {}, clearing playback context", container.id);
            self.context.clear();
        }
    }

    /// Play `episode` from the children shown for `container_id`.
    pub fn play_from_container(&mut self, container_id: &str, children: Vec<ItemRecord>, episode: ItemRecord) {
        self.context = PlaybackContext::from_container(container_id, children);
        debug!(
            "Playing {} from {} ({} episodes)",
            episode.id,
            container_id,
            self.context.current_episode_list.len()
        );
        self.active = Some(episode);
    }

    /// Play an item picked outside a container, e.g. from search or history.
    pub fn play_direct(&mut self, item: ItemRecord) {
        self.context.clear();
        self.active = Some(item);
    }

    pub async fn advance_or_exit(&mut self) -> Advance {
        let Some(active) = self.active.take() else {
            return Advance::Exit;
        };

        if let Some(next) = self.context.next_after(&active.id).cloned() {
            debug!("Advancing from {} to {}", active.id, next.id);
            return self.start(next);
        }

        let Some(next_season) = self.context.current_season_id.as_deref().and_then(next_season_id) else {
            debug!("No next episode after {} and no season to advance to", active.id);
            return Advance::Exit;
        };

        let episodes = playable(self.source.episodes(&next_season).await);
        let Some(first) = episodes.first().cloned() else {
            debug!("Season {} has nothing to play", next_season);
            return Advance::Exit;
        };

        debug!("Advancing from {} into season {}", active.id, next_season);
        self.context.current_season_id = Some(next_season);
        self.context.current_episode_list = episodes;
        self.start(first)
    }

    fn start(&mut self, item: ItemRecord) -> Advance {
        self.active = Some(item.clone());
        Advance::Play(item)
    }
}

fn playable(items: Vec<ItemRecord>) -> Vec<ItemRecord> {
    items.into_iter().filter(|i| i.item_type.is_playable()).collect()
}

#[cfg(test)]
mod tests;
