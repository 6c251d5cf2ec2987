pub mod config;
pub mod error;
pub mod paths;

pub use config::{CacheConfig, Config, LoggingConfig, ProviderConfig, ProviderKind};
pub use error::ConfigError;
pub use paths::{PathManager, container_base_path};
