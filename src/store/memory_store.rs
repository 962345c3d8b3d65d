use dashmap::DashMap;
use std::collections::HashMap;

use crate::{
    error::StoreError,
    store::{HashBackend, HashStore},
};

/// [`HashStore`] kept in process memory.
pub type MemoryStore = HashStore<MemoryBackend>;

/// Implement of [`HashBackend`] base on dashmap.
///
/// Entries are only shared inside one process, which makes this backend suitable for
/// tests and single-instance deployments. Like Redis, an emptied hash is dropped.
#[derive(Default)]
pub struct MemoryBackend {
    hashes: DashMap<String, HashMap<String, String>>,
}

impl MemoryBackend {
    /*!
    Create a new [`crate::store::MemoryBackend`] instance.

    Example:
    ```rust
    use ratelimit_store::config::StoreConfig;
    use ratelimit_store::store::{MemoryBackend, MemoryStore};

    let store = MemoryStore::new(StoreConfig::default().backend(MemoryBackend::new())).unwrap();
    ```
    */
    pub fn new() -> Self {
        Self {
            hashes: DashMap::new(),
        }
    }

    /// Copy of every field currently stored under `namespace`.
    pub fn snapshot(&self, namespace: &str) -> HashMap<String, String> {
        self.hashes
            .get(namespace)
            .map(|hash| hash.value().clone())
            .unwrap_or_default()
    }
}

impl HashBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory provider"
    }

    fn hexists(&self, namespace: &str, field: &str) -> Result<bool, StoreError> {
        Ok(self
            .hashes
            .get(namespace)
            .is_some_and(|hash| hash.contains_key(field)))
    }

    fn hget(&self, namespace: &str, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .hashes
            .get(namespace)
            .and_then(|hash| hash.get(field).map(|value| value.clone().into_bytes())))
    }

    fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.hashes
            .entry(namespace.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    fn hdel(&self, namespace: &str, field: &str) -> Result<bool, StoreError> {
        let removed = match self.hashes.get_mut(namespace) {
            Some(mut hash) => hash.remove(field).is_some(),
            None => false,
        };

        // The shard guard above must be released before touching the map again.
        self.hashes.remove_if(namespace, |_, hash| hash.is_empty());
        Ok(removed)
    }
}
