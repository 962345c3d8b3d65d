/*!
Pluggable persistence for rate limiting middleware state.

A rate limiter keeps one [`types::Ratelimit`] record per client. This crate stores those
records in a hash-map style key-value store, grouped under one namespace, and exposes
them through the [`store::RatelimitStore`] trait:

- `get` loads a client's record (`None` if it was never written or was reset)
- `put` overwrites it
- `reset` removes it and reports whether it existed
- `name` identifies the backend in logs

The rate limiting math and the HTTP side stay in the middleware.

## Features

- **Pluggable Storage**: in-memory (dashmap) and Redis (hash per namespace) backends
- **Explicit Errors**: storage failures are returned, never swallowed, so the middleware
  can choose to fail open or closed
- **Normalize On Read**: every successful `get` re-persists the decoded record by
  default; turn it off for read-heavy deployments
- **Thread Safe**: stores are `Send + Sync` and can be shared behind an `Arc`

## Quick Start

Add this to your `Cargo.toml`:

```toml
[dependencies]
ratelimit-store = "0.1"

# Or, without Redis support
ratelimit-store = { version = "0.1", default-features = false }
```

### In-Memory Store

```rust
use chrono::{Duration, Utc};
use ratelimit_store::config::StoreConfig;
use ratelimit_store::store::{MemoryBackend, MemoryStore, RatelimitStore};
use ratelimit_store::types::Ratelimit;

let store = MemoryStore::new(StoreConfig::default().backend(MemoryBackend::new()))?;

let record = Ratelimit::new(10, 9, Utc::now() + Duration::seconds(60));
store.put("1.2.3.4", &record)?;
assert_eq!(store.get("1.2.3.4")?, Some(record));

assert!(store.reset("1.2.3.4")?);
assert_eq!(store.get("1.2.3.4")?, None);
# Ok::<(), ratelimit_store::error::StoreError>(())
```

### Redis Store
feature `redis` is enabled by default:

```rust,no_run
# #[cfg(feature = "redis")]
# {
use ratelimit_store::config::{RedisConfig, StoreConfig};
use ratelimit_store::store::{RatelimitStore, RedisStore};
use std::sync::Arc;

let config = StoreConfig::default()
    // Hash name shared by every entry of this store
    .namespace("myapp_ratelimit")
    .redis(&RedisConfig::new("redis://127.0.0.1/0"))?;
let store: Arc<dyn RatelimitStore> = Arc::new(RedisStore::new(config)?);
# }
# Ok::<(), ratelimit_store::error::StoreError>(())
```
 */
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{HashStore, RatelimitStore};
pub use types::Ratelimit;
