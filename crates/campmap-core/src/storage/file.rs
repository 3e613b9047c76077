//! File-backed storage tier for native hosts.
//!
//! The larger-capacity secondary tier: one JSON file per key in a base
//! directory.

use super::{BoxFuture, StorageError, StorageResult, StorageTier};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// File-backed key-value tier.
pub struct FileTier {
    /// Base directory for stored keys.
    base_path: PathBuf,
}

impl FileTier {
    /// Create a file tier rooted at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file tier in the default location.
    ///
    /// On Unix: `~/.local/share/campmap/state/`
    /// On Windows: `%APPDATA%\campmap\state\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("campmap").join("state"))
    }

    /// Get the file path for a key.
    fn key_path(&self, key: &str) -> PathBuf {
        // Sanitize the key to be safe for filenames
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

fn map_write_error(e: std::io::Error, path: &std::path::Path) -> StorageError {
    match e.kind() {
        ErrorKind::QuotaExceeded | ErrorKind::StorageFull => {
            StorageError::QuotaExceeded(format!("{}: {}", path.display(), e))
        }
        _ => StorageError::Io(format!("Failed to write {}: {}", path.display(), e)),
    }
}

impl StorageTier for FileTier {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.key_path(key);
        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            fs::read_to_string(&path)
                .map(Some)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.key_path(key);
        let value = value.to_string();
        Box::pin(async move { fs::write(&path, value).map_err(|e| map_write_error(e, &path)) })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.key_path(key);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }
}
