use futures::future::join_all;
use futures::FutureExt;
use media_catalog_models::ItemRecord;
use media_catalog_sources::{CatalogProvider, SourceError};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Fan-out/fan-in over the registered providers.
///
/// Bulk calls run every provider concurrently and concatenate their results in
/// registration order. A provider that errors or panics contributes nothing;
/// it never takes the others down with it.
pub struct ProviderGateway {
    providers: Vec<Arc<dyn CatalogProvider>>,
}

impl ProviderGateway {
    pub fn new(providers: Vec<Arc<dyn CatalogProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.source_name()).collect()
    }

    pub async fn listing(&self) -> Vec<ItemRecord> {
        self.fan_out("listing", |provider| async move { provider.listing().await })
            .await
    }

    pub async fn children(&self, parent_id: &str) -> Vec<ItemRecord> {
        self.fan_out("children", |provider| {
            let parent_id = parent_id.to_string();
            async move { provider.children(&parent_id).await }
        })
        .await
    }

    /// Search all providers. Returns None if `cancel` fired before every
    /// provider answered; partial results are dropped in that case.
    pub async fn search(&self, query: &str, cancel: &CancellationToken) -> Option<Vec<ItemRecord>> {
        let search = self.fan_out("search", |provider| {
            let query = query.to_string();
            let cancel = cancel.clone();
            async move { provider.search(&query, &cancel).await }
        });

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            items = search => Some(items),
        };

        // A result that raced with cancellation is still stale
        if results.is_none() || cancel.is_cancelled() {
            debug!("Search for '{}' superseded, discarding results", query);
            return None;
        }

        results.map(|items| order_channel_matches(query, items))
    }

    /// Ask providers one at a time, in registration order, until one knows the id.
    pub async fn item(&self, id: &str) -> Option<ItemRecord> {
        for provider in &self.providers {
            match AssertUnwindSafe(provider.item(id)).catch_unwind().await {
                Ok(Ok(Some(record))) => {
                    debug!("Item {} found by {}", id, provider.source_name());
                    return Some(record);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => warn!("Item lookup for {} failed: {}", id, e),
                Err(_) => error!("Provider {} panicked looking up {}", provider.source_name(), id),
            }
        }
        debug!("No provider knows item {}", id);
        None
    }

    async fn fan_out<F, Fut>(&self, operation: &str, call: F) -> Vec<ItemRecord>
    where
        F: Fn(Arc<dyn CatalogProvider>) -> Fut,
        Fut: Future<Output = Result<Vec<ItemRecord>, SourceError>>,
    {
        let calls = self.providers.iter().map(|provider| {
            let name = provider.source_name().to_string();
            let call = call(provider.clone());
            async move {
                match AssertUnwindSafe(call).catch_unwind().await {
                    Ok(Ok(items)) => {
                        debug!("{} from {}: {} items", operation, name, items.len());
                        items
                    }
                    Ok(Err(e)) => {
                        warn!("{} failed: {}", operation, e);
                        Vec::new()
                    }
                    Err(_) => {
                        error!("Provider {} panicked during {}", name, operation);
                        Vec::new()
                    }
                }
            }
        });

        // join_all yields results in input order, whatever order providers finish in
        join_all(calls).await.into_iter().flatten().collect()
    }
}

/// Put live channels whose number starts with a short numeric query first.
///
/// Applies to all-digit queries of one to three characters. The partition is
/// stable, so provider order is kept within both groups.
pub fn order_channel_matches(query: &str, items: Vec<ItemRecord>) -> Vec<ItemRecord> {
    let query = query.trim();
    let is_channel_query = (1..=3).contains(&query.len()) && query.chars().all(|c| c.is_ascii_digit());
    if !is_channel_query {
        return items;
    }

    let (channels, rest): (Vec<_>, Vec<_>) = items.into_iter().partition(|record| {
        record.is_live
            && record
                .channel_number
                .as_deref()
                .is_some_and(|number| number.starts_with(query))
    });
    channels.into_iter().chain(rest).collect()
}

/// Tracks the in-flight search so a new one cancels its predecessor.
#[derive(Debug, Default)]
pub struct SearchSession {
    current: Mutex<Option<CancellationToken>>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the previous search (if any) and hand out a token for the next one.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().unwrap_or_else(PoisonError::into_inner).take() {
            token.cancel();
        }
    }
}
