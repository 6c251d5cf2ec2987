use async_trait::async_trait;
use media_catalog_models::ItemRecord;
use tokio_util::sync::CancellationToken;
use crate::SourceError;

/// A content source that can be browsed, searched and queried by id.
///
/// Implementations are called concurrently with other providers and from any
/// task, so they must not rely on a particular caller thread.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    // Provider name, stamped into ItemRecord::source
    fn source_name(&self) -> &str;

    // Top-level catalog
    async fn listing(&self) -> Result<Vec<ItemRecord>, SourceError>;

    // Free-text search. Implementations may stop early once `cancel` fires;
    // the caller discards whatever they return after that anyway.
    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<ItemRecord>, SourceError>;

    // Contents of a container (brand, season, folder)
    async fn children(&self, parent_id: &str) -> Result<Vec<ItemRecord>, SourceError>;

    // Point lookup. Ok(None) means this provider does not know the id.
    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, SourceError>;
}
