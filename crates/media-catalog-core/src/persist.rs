//! JSON document persistence shared by the history, watchlist and item cache stores.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};
use crate::error::{CatalogError, Result};

/// Load a JSON document, returning None when it is missing or unreadable.
///
/// A corrupt document is moved aside to `<file>.bak` so the next write can
/// start a fresh one without losing the old bytes.
///
/// Reads with blocking `std::fs`. Only the store constructors call this, once,
/// while `Catalog::open` runs; every later write goes through [`write_atomic`].
pub fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Option<T> {
    if !path.exists() {
        debug!("No {} file at {:?}, starting empty", what, path);
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {} file {:?}: {}. Starting empty.", what, path, e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(document) => Some(document),
        Err(e) => {
            let backup_path = path.with_extension("json.bak");
            match std::fs::rename(path, &backup_path) {
                Ok(()) => warn!(
                    "Corrupt {} file {:?} ({}). Moved it to {:?} and starting empty.",
                    what, path, e, backup_path
                ),
                Err(rename_err) => warn!(
                    "Corrupt {} file {:?} ({}), and it could not be moved aside: {}. Starting empty.",
                    what, path, e, rename_err
                ),
            }
            None
        }
    }
}

pub fn to_json<T: Serialize>(document: &T, what: &'static str) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(document).map_err(|source| CatalogError::Json { what, source })
}

/// Atomic write: write to a temp file next to the target, then rename over it.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<()> {
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, bytes).await.map_err(io_err)?;
    tokio::fs::rename(&temp_path, path).await.map_err(io_err)?;
    Ok(())
}
