//! Catalog provider for JSON catalogs served over HTTP (tuner boxes, media servers,
//! catalog proxies).
//!
//! Endpoints, relative to the configured base URL:
//! `GET /listing`, `GET /search?q=`, `GET /children/{id}`, `GET /items/{id}`.

use async_trait::async_trait;
use media_catalog_models::ItemRecord;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::{CatalogProvider, SourceError, SourceErrorKind};

pub struct HttpCatalogProvider {
    name: String,
    base_url: String,
    client: Client,
}

impl HttpCatalogProvider {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let name = name.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::new(&name, SourceErrorKind::Network(e.to_string())))?;
        Ok(Self {
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn network_error(&self, e: reqwest::Error) -> SourceError {
        SourceError::new(&self.name, SourceErrorKind::Network(e.to_string()))
    }

    /// GET a JSON body. Returns Ok(None) on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, SourceError> {
        let url = self.url(path);
        debug!("GET {} ({})", url, self.name);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::new(&self.name, SourceErrorKind::Status(status.as_u16())));
        }

        let body = response.text().await.map_err(|e| self.network_error(e))?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| SourceError::new(&self.name, SourceErrorKind::Parse(e.to_string())))
    }

    async fn get_list(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<ItemRecord>, SourceError> {
        let records: Vec<ItemRecord> = self.get_json(path, query).await?.unwrap_or_default();
        Ok(records.into_iter().map(|r| self.stamp(r)).collect())
    }

    fn stamp(&self, mut record: ItemRecord) -> ItemRecord {
        record.source = self.name.clone();
        record
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn listing(&self) -> Result<Vec<ItemRecord>, SourceError> {
        self.get_list("/listing", &[]).await
    }

    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<ItemRecord>, SourceError> {
        let params = [("q", query)];
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Search for '{}' on {} cancelled", query, self.name);
                Ok(Vec::new())
            }
            result = self.get_list("/search", &params) => result,
        }
    }

    async fn children(&self, parent_id: &str) -> Result<Vec<ItemRecord>, SourceError> {
        let path = format!("/children/{}", urlencoding::encode(parent_id));
        self.get_list(&path, &[]).await
    }

    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, SourceError> {
        let path = format!("/items/{}", urlencoding::encode(id));
        let record: Option<ItemRecord> = self.get_json(&path, &[]).await?;
        Ok(record.map(|r| self.stamp(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn provider(server: &Server) -> HttpCatalogProvider {
        HttpCatalogProvider::new("tuner", format!("{}/", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_listing_parses_and_stamps_records() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/listing")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"bbc1","name":"BBC One","type":"Channel","isLive":true,"channelNumber":"101"}]"#)
            .create_async()
            .await;

        let items = provider(&server).listing().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "tuner");
        assert_eq!(items[0].channel_number.as_deref(), Some("101"));
    }

    #[tokio::test]
    async fn test_search_sends_query() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "news at ten".into()))
            .with_status(200)
            .with_body(r#"[{"id":"n1","name":"News at Ten","type":"Video"}]"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let items = provider(&server).search("news at ten", &cancel).await.unwrap();
        assert_eq!(items[0].id, "n1");
    }

    #[tokio::test]
    async fn test_item_not_found_is_none() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/items/missing")
            .with_status(404)
            .create_async()
            .await;

        assert!(provider(&server).item("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_and_bad_body_are_errors() {
        let mut server = Server::new_async().await;
        let _m1 = server
            .mock("GET", "/listing")
            .with_status(500)
            .create_async()
            .await;
        let _m2 = server
            .mock("GET", "/children/season-1")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let provider = provider(&server);
        let err = provider.listing().await.unwrap_err();
        assert!(matches!(err.kind(), SourceErrorKind::Status(500)));

        let err = provider.children("season-1").await.unwrap_err();
        assert!(matches!(err.kind(), SourceErrorKind::Parse(_)));
    }
}
