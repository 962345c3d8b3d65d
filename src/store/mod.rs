mod hash_store;
mod memory_store;
#[cfg(feature = "redis")]
mod redis_store;
mod traits;

pub use hash_store::HashStore;
pub use memory_store::{MemoryBackend, MemoryStore};
#[cfg(feature = "redis")]
pub use redis_store::{RedisBackend, RedisStore};
pub use traits::{HashBackend, RatelimitStore};
