use std::sync::Arc;

use crate::{error::StoreError, types::Ratelimit};

/// Capability set a rate limiting middleware needs from its persistence layer.
///
/// All calls are blocking and may perform network I/O. A missing entry is reported as
/// `Ok(None)` / `Ok(false)`; any `Err` means the storage is unavailable.
pub trait RatelimitStore: Send + Sync {
    /// Human-readable identifier, for diagnostics only.
    fn name(&self) -> &'static str;

    /// Loads the current state for `key`, or `None` if it was never written or was reset.
    fn get(&self, key: &str) -> Result<Option<Ratelimit>, StoreError>;

    /// Stores `value` for `key`, overwriting whatever was there.
    fn put(&self, key: &str, value: &Ratelimit) -> Result<(), StoreError>;

    /// Removes the state for `key`. Returns whether an entry existed.
    fn reset(&self, key: &str) -> Result<bool, StoreError>;
}

// Implement the trait for a trait object of itself, to support dynamic dispatch
impl RatelimitStore for Box<dyn RatelimitStore> {
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

// Implement the trait for Arc wrapped trait object
impl RatelimitStore for Arc<dyn RatelimitStore> {
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

/// Hash-map style remote store: one hash per namespace, one field per caller key.
///
/// Implementations must be safe to share between threads. Values are written as UTF-8
/// text but read back as raw bytes, since nothing stops another client from storing
/// arbitrary data in the hash.
pub trait HashBackend: Send + Sync {
    /// Diagnostic name reported by the store built on this backend.
    fn name(&self) -> &'static str;

    fn hexists(&self, namespace: &str, field: &str) -> Result<bool, StoreError>;

    fn hget(&self, namespace: &str, field: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `field`. Deleting an absent field is a no-op that returns `false`.
    fn hdel(&self, namespace: &str, field: &str) -> Result<bool, StoreError>;
}
