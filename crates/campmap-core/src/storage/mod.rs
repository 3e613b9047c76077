//! Quota-aware persistence for editor state.

mod controller;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use controller::{
    NotificationKind, PersistenceConfig, PersistenceController, QuotaAction, SaveOutcome,
    StorageNotification, DEFAULT_MAX_MAPS_TO_KEEP, DEFAULT_SOFT_LIMIT_BYTES, DEFAULT_STORAGE_KEY,
};
pub use memory::MemoryTier;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTier;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    /// Whether this error is a capacity rejection from the storage tier.
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A capacity-bounded key-value storage tier.
///
/// `set` may fail with [`StorageError::QuotaExceeded`] when the tier's
/// capacity would be exceeded; the persistence controller handles that by
/// degrading the payload rather than surfacing the error.
pub trait StorageTier: Send + Sync {
    /// Read the value stored under a key, if any.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Write a value under a key.
    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// One saved map. Opaque to the persistence layer beyond `id` and
/// `updated_at`; the remaining fields ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: u64,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl MapRecord {
    /// Create a record with an empty payload.
    pub fn new(id: impl Into<String>, updated_at: u64) -> Self {
        Self {
            id: id.into(),
            updated_at,
            data: Map::new(),
        }
    }
}

/// The full persisted editor state, stored as one blob under a fixed key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub maps: Vec<MapRecord>,
    pub selected_map_id: Option<String>,
    /// Milliseconds since the Unix epoch at the time of the save.
    pub timestamp: u64,
}

impl EditorState {
    /// Create a state stamped with the current time.
    pub fn new(maps: Vec<MapRecord>, selected_map_id: Option<String>) -> Self {
        Self {
            maps,
            selected_map_id,
            timestamp: now_millis(),
        }
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
