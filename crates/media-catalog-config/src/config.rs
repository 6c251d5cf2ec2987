use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Content providers, in registration order. Bulk results are merged in this order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// JSON catalog document on local disk
    File,
    /// JSON catalog served over HTTP
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Window in which raw item cache writes are coalesced into one
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    #[serde(default = "default_watchlist_file")]
    pub watchlist_file: PathBuf,
    #[serde(default = "default_item_cache_file")]
    pub item_cache_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_history_file() -> PathBuf {
    PathBuf::from("history.json")
}

fn default_watchlist_file() -> PathBuf {
    PathBuf::from("watchlist.json")
}

fn default_item_cache_file() -> PathBuf {
    PathBuf::from("item_cache.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            history_file: default_history_file(),
            watchlist_file: default_watchlist_file(),
            item_cache_file: default_item_cache_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.debounce_ms == 0 {
            return Err(ConfigError::Invalid("cache.debounce_ms must be greater than zero".to_string()));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(ConfigError::Invalid("provider name cannot be empty".to_string()));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate provider name: {}", provider.name)));
            }
            match provider.kind {
                ProviderKind::File if provider.path.is_none() => {
                    return Err(ConfigError::Invalid(format!(
                        "file provider '{}' requires a path",
                        provider.name
                    )));
                }
                ProviderKind::Http if provider.base_url.as_deref().map_or(true, str::is_empty) => {
                    return Err(ConfigError::Invalid(format!(
                        "http provider '{}' requires a base_url",
                        provider.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Enabled providers in registration order
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(|p| p.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[providers]]
        name = "tuner"
        kind = "http"
        base_url = "http://192.168.1.20:5004"

        [[providers]]
        name = "library"
        kind = "file"
        path = "/media/catalog.json"

        [[providers]]
        name = "archive"
        kind = "file"
        path = "/media/archive.json"
        enabled = false

        [cache]
        debounce_ms = 250
    "#;

    #[test]
    fn test_parse_keeps_provider_order() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let names: Vec<_> = config.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["tuner", "library", "archive"]);
        assert_eq!(config.providers[0].timeout_secs, 15);
        assert_eq!(config.cache.debounce_ms, 250);
        assert_eq!(config.cache.history_file, PathBuf::from("history.json"));
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_enabled_providers_skips_disabled() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let names: Vec<_> = config.enabled_providers().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["tuner", "library"]);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_missing_locations() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.providers[1].name = "tuner".to_string();
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.providers[1].path = None;
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.providers[0].base_url = Some(String::new());
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.cache.debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config: Config = toml::from_str(SAMPLE).unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.providers.len(), 3);
        assert_eq!(loaded.providers[0].kind, ProviderKind::Http);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.providers.is_empty());
        assert_eq!(config.cache.debounce_ms, 500);
    }
}
