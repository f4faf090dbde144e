//! In-memory key-value store
//!
//! Backs ephemeral sessions and tests. An optional quota (in bytes, counting
//! keys and values) makes writes fail the way a full browser store does.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::error::{StorageError, StorageResult};
use super::KeyValueStore;

/// Key-value store held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once `bytes` would be exceeded
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Total bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.lock()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.lock();

        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);

        store.set("k", "12345").unwrap();
        assert_eq!(store.used_bytes(), 6);

        let err = store.set("other", "123456").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));

        // Previous value survives the failed write
        assert_eq!(store.get("k").unwrap().as_deref(), Some("12345"));
        assert!(store.get("other").unwrap().is_none());
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let store = MemoryStore::with_quota(8);

        store.set("k", "1234567").unwrap();
        // Overwriting the same key only counts the new value
        store.set("k", "7654321").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("7654321"));
    }
}
