//! Catalog provider backed by a JSON document on local disk.
//!
//! The document is re-read on every call so edits show up without a restart:
//!
//! ```json
//! { "items": [ ... ], "children": { "show|1": [ ... ] } }
//! ```

use async_trait::async_trait;
use media_catalog_models::ItemRecord;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::query::matches_query;
use crate::{CatalogProvider, SourceError, SourceErrorKind};

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    items: Vec<ItemRecord>,
    #[serde(default)]
    children: HashMap<String, Vec<ItemRecord>>,
}

pub struct FileCatalogProvider {
    name: String,
    path: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    async fn load(&self) -> Result<CatalogDocument, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::new(&self.name, SourceErrorKind::Io(e)))?;
        let document: CatalogDocument = serde_json::from_str(&content)
            .map_err(|e| SourceError::new(&self.name, SourceErrorKind::Parse(e.to_string())))?;
        debug!(
            "Loaded catalog {} from {:?} ({} items, {} containers)",
            self.name,
            self.path,
            document.items.len(),
            document.children.len()
        );
        Ok(document)
    }

    fn stamp(&self, mut record: ItemRecord) -> ItemRecord {
        record.source = self.name.clone();
        record
    }
}

#[async_trait]
impl CatalogProvider for FileCatalogProvider {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn listing(&self) -> Result<Vec<ItemRecord>, SourceError> {
        let document = self.load().await?;
        Ok(document.items.into_iter().map(|r| self.stamp(r)).collect())
    }

    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<ItemRecord>, SourceError> {
        let document = self.load().await?;
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let CatalogDocument { items, children } = document;
        Ok(items
            .into_iter()
            .chain(children.into_values().flatten())
            .filter(|r| matches_query(r, query))
            .map(|r| self.stamp(r))
            .collect())
    }

    async fn children(&self, parent_id: &str) -> Result<Vec<ItemRecord>, SourceError> {
        let mut document = self.load().await?;
        Ok(document
            .children
            .remove(parent_id)
            .unwrap_or_default()
            .into_iter()
            .map(|r| self.stamp(r))
            .collect())
    }

    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, SourceError> {
        let CatalogDocument { items, children } = self.load().await?;
        Ok(items
            .into_iter()
            .chain(children.into_values().flatten())
            .find(|r| r.id == id)
            .map(|r| self.stamp(r)))
    }
}
