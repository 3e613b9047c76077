//! In-memory storage tier with an optional byte capacity.
//!
//! Used as the default primary tier in tests and to simulate the quota
//! behavior of browser local storage.

use super::{BoxFuture, StorageError, StorageResult, StorageTier};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key-value tier. With a capacity set, writes that would push
/// the total stored bytes past it fail with a quota error.
#[derive(Default)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryTier {
    /// Create an unbounded memory tier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory tier that rejects writes past `bytes` of total
    /// stored value data.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(bytes),
        }
    }

    /// Total bytes of stored values.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().map(String::len).sum())
            .unwrap_or(0)
    }
}

impl StorageTier for MemoryTier {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self
                .entries
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(entries.get(&key).cloned())
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;

            if let Some(capacity) = self.capacity {
                let existing = entries.get(&key).map_or(0, String::len);
                let projected: usize =
                    entries.values().map(String::len).sum::<usize>() - existing + value.len();
                if projected > capacity {
                    return Err(StorageError::QuotaExceeded(format!(
                        "{} bytes exceeds capacity of {}",
                        projected, capacity
                    )));
                }
            }

            entries.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            entries.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_util::block_on;

    #[test]
    fn test_set_and_get() {
        let tier = MemoryTier::new();
        block_on(tier.set("key", "value")).unwrap();
        assert_eq!(block_on(tier.get("key")).unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_get_absent() {
        let tier = MemoryTier::new();
        assert!(block_on(tier.get("missing")).unwrap().is_none());
    }

    #[test]
    fn test_remove() {
        let tier = MemoryTier::new();
        block_on(tier.set("key", "value")).unwrap();
        block_on(tier.remove("key")).unwrap();
        assert!(block_on(tier.get("key")).unwrap().is_none());
        // Removing an absent key is fine
        block_on(tier.remove("key")).unwrap();
    }

    #[test]
    fn test_capacity_rejects_oversized_write() {
        let tier = MemoryTier::with_capacity(10);
        let result = block_on(tier.set("key", "this value is far too large"));
        assert!(matches!(result, Err(StorageError::QuotaExceeded(_))));
        assert!(block_on(tier.get("key")).unwrap().is_none());
    }

    #[test]
    fn test_capacity_counts_replaced_value_once() {
        let tier = MemoryTier::with_capacity(10);
        block_on(tier.set("key", "0123456789")).unwrap();
        // Replacing the value frees its old bytes first
        block_on(tier.set("key", "abcdefghij")).unwrap();
        assert_eq!(tier.used_bytes(), 10);
    }
}
