//! Scriptable provider used by the unit tests.

use async_trait::async_trait;
use media_catalog_models::{ItemRecord, ItemType};
use media_catalog_sources::{CatalogProvider, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behaviour {
    #[default]
    Normal,
    Fail,
    Panic,
}

#[derive(Default)]
pub struct StubProvider {
    name: String,
    listing: Vec<ItemRecord>,
    children: HashMap<String, Vec<ItemRecord>>,
    items: Mutex<HashMap<String, ItemRecord>>,
    behaviour: Behaviour,
    delay: Duration,
    pub listing_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_listing(mut self, ids: &[&str]) -> Self {
        self.listing = ids.iter().map(|id| self.record(id)).collect();
        self
    }

    pub fn with_records(mut self, records: Vec<ItemRecord>) -> Self {
        self.listing = records.into_iter().map(|r| r.with_source(self.name.clone())).collect();
        self
    }

    pub fn with_children(mut self, parent_id: &str, ids: &[&str]) -> Self {
        let children = ids.iter().map(|id| self.record(id)).collect();
        self.children.insert(parent_id.to_string(), children);
        self
    }

    pub fn with_child_records(mut self, parent_id: &str, records: Vec<ItemRecord>) -> Self {
        let records = records.into_iter().map(|r| r.with_source(self.name.clone())).collect();
        self.children.insert(parent_id.to_string(), records);
        self
    }

    pub fn with_item(self, id: &str, name: &str) -> Self {
        let record = ItemRecord::new(id, name, ItemType::Video).with_source(self.name.clone());
        self.items.lock().unwrap().insert(id.to_string(), record);
        self
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change what a later `item` lookup returns.
    pub fn set_item(&self, id: &str, name: &str) {
        let record = ItemRecord::new(id, name, ItemType::Video).with_source(self.name.clone());
        self.items.lock().unwrap().insert(id.to_string(), record);
    }

    fn record(&self, id: &str) -> ItemRecord {
        ItemRecord::new(id, format!("{} {}", self.name, id), ItemType::Video).with_source(self.name.clone())
    }

    async fn act(&self) -> Result<(), SourceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.behaviour {
            Behaviour::Normal => Ok(()),
            Behaviour::Fail => Err(SourceError::other(&self.name, "scripted failure")),
            Behaviour::Panic => panic!("scripted panic in {}", self.name),
        }
    }
}

#[async_trait]
impl CatalogProvider for StubProvider {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn listing(&self) -> Result<Vec<ItemRecord>, SourceError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.act().await?;
        Ok(self.listing.clone())
    }

    async fn search(&self, query: &str, _cancel: &CancellationToken) -> Result<Vec<ItemRecord>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.act().await?;
        Ok(self
            .listing
            .iter()
            .filter(|r| r.name.contains(query) || r.channel_number.as_deref().is_some_and(|c| c.starts_with(query)))
            .cloned()
            .collect())
    }

    async fn children(&self, parent_id: &str) -> Result<Vec<ItemRecord>, SourceError> {
        self.act().await?;
        Ok(self.children.get(parent_id).cloned().unwrap_or_default())
    }

    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, SourceError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        self.act().await?;
        Ok(self.items.lock().unwrap().get(id).cloned())
    }
}
