//! Provider factory pattern for creating catalog providers from configuration
//!
//! Providers are created in the order they appear in the config file. That order
//! is the registration order the gateway merges bulk results by.

use media_catalog_config::{Config, ProviderConfig, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use crate::{CatalogProvider, FileCatalogProvider, HttpCatalogProvider, SourceError};

/// Factory trait for creating providers of one kind
pub trait ProviderFactory: Send + Sync {
    /// The provider kind this factory creates
    fn kind(&self) -> ProviderKind;

    /// Create a provider instance from its config entry
    fn create_provider(&self, config: &ProviderConfig) -> Result<Arc<dyn CatalogProvider>, SourceError>;
}

/// Registry of provider factories, keyed by kind
pub struct ProviderFactoryRegistry {
    factories: HashMap<ProviderKind, Box<dyn ProviderFactory>>,
}

impl ProviderFactoryRegistry {
    /// Create a new registry with all built-in factories registered
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register(Box::new(FileProviderFactory));
        registry.register(Box::new(HttpProviderFactory));

        registry
    }

    /// Register a new factory, replacing any existing factory for the same kind
    pub fn register(&mut self, factory: Box<dyn ProviderFactory>) {
        self.factories.insert(factory.kind(), factory);
    }

    /// Create all enabled providers, preserving config order
    pub fn create_all_providers(&self, config: &Config) -> Result<Vec<Arc<dyn CatalogProvider>>, SourceError> {
        let mut providers = Vec::new();

        for provider_config in config.enabled_providers() {
            let factory = self.factories.get(&provider_config.kind).ok_or_else(|| {
                SourceError::other(
                    &provider_config.name,
                    format!("no factory registered for {:?} providers", provider_config.kind),
                )
            })?;
            let provider = factory.create_provider(provider_config)?;
            info!("Registered provider {} ({:?})", provider.source_name(), provider_config.kind);
            providers.push(provider);
        }

        Ok(providers)
    }

    /// Check if a provider kind is registered
    pub fn is_registered(&self, kind: ProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }
}

impl Default for ProviderFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct FileProviderFactory;

impl ProviderFactory for FileProviderFactory {
    fn kind(&self) -> ProviderKind {
        ProviderKind::File
    }

    fn create_provider(&self, config: &ProviderConfig) -> Result<Arc<dyn CatalogProvider>, SourceError> {
        let path = config
            .path
            .clone()
            .ok_or_else(|| SourceError::other(&config.name, "file provider requires a path"))?;
        Ok(Arc::new(FileCatalogProvider::new(config.name.clone(), path)))
    }
}

struct HttpProviderFactory;

impl ProviderFactory for HttpProviderFactory {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Http
    }

    fn create_provider(&self, config: &ProviderConfig) -> Result<Arc<dyn CatalogProvider>, SourceError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| SourceError::other(&config.name, "http provider requires a base_url"))?;
        let provider = HttpCatalogProvider::new(
            config.name.clone(),
            base_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        toml::from_str(
            r#"
            [[providers]]
            name = "tuner"
            kind = "http"
            base_url = "http://localhost:5004"

            [[providers]]
            name = "disabled"
            kind = "file"
            path = "/tmp/none.json"
            enabled = false

            [[providers]]
            name = "library"
            kind = "file"
            path = "/tmp/library.json"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_creates_enabled_providers_in_config_order() {
        let registry = ProviderFactoryRegistry::new();
        let providers = registry.create_all_providers(&config()).unwrap();
        let names: Vec<_> = providers.iter().map(|p| p.source_name()).collect();
        assert_eq!(names, vec!["tuner", "library"]);
    }

    #[test]
    fn test_missing_location_is_an_error() {
        let registry = ProviderFactoryRegistry::new();
        let mut config = config();
        config.providers[2].path = None;
        assert!(registry.create_all_providers(&config).is_err());
    }

    #[test]
    fn test_builtin_kinds_registered() {
        let registry = ProviderFactoryRegistry::default();
        assert!(registry.is_registered(ProviderKind::File));
        assert!(registry.is_registered(ProviderKind::Http));
    }
}
