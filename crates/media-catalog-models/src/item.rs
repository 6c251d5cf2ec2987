use serde::{Deserialize, Serialize};

/// Kind of catalog entry as reported by a provider.
///
/// `Brand` and `Folder` are containers: they have children but nothing to play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ItemType {
    #[default]
    Video,
    Audio,
    Brand,
    Folder,
    Channel,
}

impl ItemType {
    pub fn is_container(self) -> bool {
        matches!(self, ItemType::Brand | ItemType::Folder)
    }

    pub fn is_playable(self) -> bool {
        !self.is_container()
    }
}

/// Immutable item metadata as returned by a provider.
///
/// Records are never mutated after a provider produces them. Newer data for the
/// same id arrives as a whole new record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub source: String, // Name of the provider that produced this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_number: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub duration: f64, // Seconds, 0 when unknown or live
}

impl ItemRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type,
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_channel(mut self, channel_number: impl Into<String>) -> Self {
        self.channel_number = Some(channel_number.into());
        self.is_live = true;
        self
    }

    /// Items without an id cannot be deduplicated or cached.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
