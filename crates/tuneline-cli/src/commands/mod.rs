pub mod browse;
pub mod clear;
pub mod config;
pub mod history;
pub mod next;
pub mod watchlist;

use color_eyre::eyre::Context;
use color_eyre::Result;
use media_catalog_config::{Config, PathManager};
use media_catalog_core::{Catalog, CatalogOptions};
use media_catalog_sources::ProviderFactoryRegistry;
use std::sync::Arc;

/// A catalog opened from the configuration for the duration of one command.
pub struct Session {
    pub catalog: Arc<Catalog>,
}

impl Session {
    pub fn open(config: &Config, paths: &PathManager) -> Result<Self> {
        config.validate().wrap_err("Invalid configuration")?;
        paths.ensure_directories().wrap_err("Failed to create data directories")?;

        let providers = ProviderFactoryRegistry::new()
            .create_all_providers(config)
            .wrap_err("Failed to create providers")?;
        if providers.is_empty() {
            tracing::warn!("No providers enabled; add [[providers]] entries to the config file");
        }

        let options = CatalogOptions::from_config(config, paths);
        tracing::debug!("Opening catalog with stores in {}", paths.data_dir().display());
        Ok(Self {
            catalog: Arc::new(Catalog::open(providers, &options)),
        })
    }

    /// Flush pending cache writes.
    pub async fn close(self) {
        self.catalog.shutdown().await;
    }
}
