use log::{debug, error, warn};
use std::sync::Arc;

use crate::{
    config::StoreConfig,
    error::StoreError,
    store::{HashBackend, RatelimitStore},
    types::Ratelimit,
};

/// [`RatelimitStore`] over any [`HashBackend`].
///
/// Entries live as fields of a single hash named after the configured namespace,
/// keyed by caller identity, with the JSON-encoded [`Ratelimit`] as value.
///
/// # Known races
///
/// Nothing here is atomic across commands. The refresh write in [`get`](Self::get) can
/// land after a concurrent [`reset`](Self::reset) and bring the entry back, and two
/// concurrent `put`s for one key resolve as last-writer-wins. Middlewares that need strict
/// per-key ordering must serialize calls per key themselves.
pub struct HashStore<B> {
    backend: B,
    namespace: String,
    refresh_on_read: bool,
}

impl<B: HashBackend> HashStore<B> {
    /// Builds a store from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if no backend was supplied or the namespace
    /// is empty.
    pub fn new(config: StoreConfig<B>) -> Result<Self, StoreError> {
        let Some(backend) = config.backend else {
            return Err(StoreError::Configuration(
                "missing backend client to use".to_string(),
            ));
        };

        if config.namespace.is_empty() {
            return Err(StoreError::Configuration(
                "namespace must not be empty".to_string(),
            ));
        }

        debug!(
            "Created {} with namespace: {}, refresh_on_read: {}",
            backend.name(),
            config.namespace,
            config.refresh_on_read
        );

        Ok(Self {
            backend,
            namespace: config.namespace,
            refresh_on_read: config.refresh_on_read,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn refreshes_on_read(&self) -> bool {
        self.refresh_on_read
    }

    /// Direct access to the backing store, bypassing the record encoding.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn log_failure(&self, op: &str, key: &str, err: &StoreError) {
        error!(
            "{} failed on {} for key({}) in {}: {}",
            op,
            self.backend.name(),
            key,
            self.namespace,
            err.chain()
        );
    }
}

impl<B: HashBackend> RatelimitStore for HashStore<B> {
    fn name(&self) -> &'static str {
        self.backend.name()
    }

    /// Reads and decodes the entry for `key`.
    ///
    /// When refresh is enabled the decoded record is re-encoded and written back before
    /// returning, so every hit costs one read and one write.
    fn get(&self, key: &str) -> Result<Option<Ratelimit>, StoreError> {
        debug!("Getting ratelimit for key({}) in {}", key, self.namespace);

        let data = match self.backend.hget(&self.namespace, key) {
            Ok(Some(data)) => data,
            Ok(None) => return Ok(None),
            Err(err) => {
                self.log_failure("HGET", key, &err);
                return Err(err);
            }
        };

        let record = Ratelimit::from_json(&data).map_err(|source| {
            warn!(
                "Corrupt ratelimit entry for key({}) in {}: {}",
                key, self.namespace, source
            );
            StoreError::CorruptData {
                key: key.to_string(),
                source,
            }
        })?;

        if self.refresh_on_read {
            let copied = record.clone();
            self.put(key, &copied)?;
        }

        Ok(Some(record))
    }

    fn put(&self, key: &str, value: &Ratelimit) -> Result<(), StoreError> {
        let data = value.to_json().map_err(StoreError::Serialization)?;

        debug!("Putting ratelimit for key({}) in {}", key, self.namespace);

        self.backend
            .hset(&self.namespace, key, &data)
            .inspect_err(|err| self.log_failure("HSET", key, err))
    }

    /// Checks for the entry, then deletes it. The two steps are separate commands; a
    /// concurrent delete in between is harmless since deleting an absent field is a no-op.
    fn reset(&self, key: &str) -> Result<bool, StoreError> {
        debug!("Resetting ratelimit for key({}) in {}", key, self.namespace);

        let exists = self
            .backend
            .hexists(&self.namespace, key)
            .inspect_err(|err| self.log_failure("HEXISTS", key, err))?;
        if !exists {
            return Ok(false);
        }

        self.backend
            .hdel(&self.namespace, key)
            .inspect_err(|err| self.log_failure("HDEL", key, err))?;
        Ok(true)
    }
}

/// Implementation of [`RatelimitStore`] for `Arc<HashStore<B>>` to enable shared ownership.
impl<B: HashBackend> RatelimitStore for Arc<HashStore<B>> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<Ratelimit>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &Ratelimit) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn reset(&self, key: &str) -> Result<bool, StoreError> {
        (**self).reset(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts writes and can fail commands or interleave deletes on demand.
    #[derive(Default)]
    struct TestBackend {
        inner: MemoryBackend,
        writes: AtomicUsize,
        broken: bool,
        reset_during_read: bool,
        delete_during_exists: bool,
        /// Served by `hget` in place of the stored value
        raw_value: Option<Vec<u8>>,
    }

    impl TestBackend {
        fn check(&self) -> Result<(), StoreError> {
            if self.broken {
                return Err(StoreError::connection("connection refused"));
            }
            Ok(())
        }
    }

    impl HashBackend for TestBackend {
        fn name(&self) -> &'static str {
            "test provider"
        }

        fn hexists(&self, namespace: &str, field: &str) -> Result<bool, StoreError> {
            self.check()?;
            let exists = self.inner.hexists(namespace, field)?;
            if self.delete_during_exists {
                self.inner.hdel(namespace, field)?;
            }
            Ok(exists)
        }

        fn hget(&self, namespace: &str, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.check()?;
            if let Some(raw) = &self.raw_value {
                return Ok(Some(raw.clone()));
            }
            let value = self.inner.hget(namespace, field)?;
            if self.reset_during_read {
                self.inner.hdel(namespace, field)?;
            }
            Ok(value)
        }

        fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<(), StoreError> {
            self.check()?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.hset(namespace, field, value)
        }

        fn hdel(&self, namespace: &str, field: &str) -> Result<bool, StoreError> {
            self.check()?;
            self.inner.hdel(namespace, field)
        }
    }

    fn record() -> Ratelimit {
        Ratelimit::new(10, 5, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn store(backend: TestBackend, refresh: bool) -> HashStore<TestBackend> {
        HashStore::new(
            StoreConfig::default()
                .refresh_on_read(refresh)
                .backend(backend),
        )
        .unwrap()
    }

    #[test]
    fn missing_backend_is_a_configuration_error() {
        let result = HashStore::new(StoreConfig::<MemoryBackend>::default());
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn empty_namespace_is_a_configuration_error() {
        let result = HashStore::new(
            StoreConfig::default()
                .namespace("")
                .backend(MemoryBackend::new()),
        );
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn name_comes_from_backend() {
        assert_eq!(store(TestBackend::default(), true).name(), "test provider");
    }

    #[test]
    fn get_refreshes_entry() {
        let store = store(TestBackend::default(), true);
        store.put("1.2.3.4", &record()).unwrap();
        assert_eq!(store.backend().writes.load(Ordering::SeqCst), 1);

        assert_eq!(store.get("1.2.3.4").unwrap(), Some(record()));
        assert_eq!(store.backend().writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn get_without_refresh_does_not_write() {
        let store = store(TestBackend::default(), false);
        store.put("1.2.3.4", &record()).unwrap();

        assert_eq!(store.get("1.2.3.4").unwrap(), Some(record()));
        assert_eq!(store.backend().writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_miss_does_not_write() {
        let store = store(TestBackend::default(), true);
        assert_eq!(store.get("1.2.3.4").unwrap(), None);
        assert_eq!(store.backend().writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn backend_failures_propagate() {
        let store = store(
            TestBackend {
                broken: true,
                ..Default::default()
            },
            true,
        );

        assert!(matches!(store.get("k"), Err(StoreError::Connection(_))));
        assert!(matches!(store.put("k", &record()), Err(StoreError::Connection(_))));
        assert!(matches!(store.reset("k"), Err(StoreError::Connection(_))));
    }

    #[test]
    fn corrupt_entry_is_not_refreshed() {
        let store = store(TestBackend::default(), true);
        store.backend().inner.hset("chi_ratelimit", "k", "{").unwrap();

        let err = store.get("k").unwrap_err();
        assert!(matches!(err, StoreError::CorruptData { ref key, .. } if key == "k"));
        assert_eq!(store.backend().writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_utf8_entry_is_corrupt_data() {
        let store = store(
            TestBackend {
                raw_value: Some(vec![0xff, 0xfe]),
                ..Default::default()
            },
            true,
        );

        let err = store.get("1.2.3.4").unwrap_err();
        assert!(matches!(err, StoreError::CorruptData { ref key, .. } if key == "1.2.3.4"));
        assert_eq!(store.backend().writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn delete_between_exists_and_delete_still_reports_reset() {
        let store = store(
            TestBackend {
                delete_during_exists: true,
                ..Default::default()
            },
            true,
        );
        store.put("k", &record()).unwrap();

        // The field is already gone when HDEL runs; that delete is a no-op.
        assert!(store.reset("k").unwrap());
        assert!(store.backend().inner.snapshot("chi_ratelimit").is_empty());
        assert!(!store.reset("k").unwrap());
    }

    #[test]
    fn reset_between_read_and_refresh_resurrects_entry() {
        let store = store(
            TestBackend {
                reset_during_read: true,
                ..Default::default()
            },
            true,
        );
        store.put("k", &record()).unwrap();

        // The hget removes the field before the refresh writes it back.
        assert_eq!(store.get("k").unwrap(), Some(record()));
        assert!(store.backend().inner.hexists("chi_ratelimit", "k").unwrap());
    }

    #[test]
    fn shared_through_arc() {
        let store: Arc<dyn RatelimitStore> = Arc::new(store(TestBackend::default(), true));
        store.put("k", &record()).unwrap();
        assert!(store.reset("k").unwrap());
        assert!(!store.reset("k").unwrap());
    }
}
