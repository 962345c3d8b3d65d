use chrono::{Duration, Utc};
use ratelimit_store::config::{RedisConfig, StoreConfig};
use ratelimit_store::store::{RatelimitStore, RedisStore};
use ratelimit_store::{Ratelimit, StoreError};
use std::sync::Arc;

fn main() -> Result<(), StoreError> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/0".to_string());
    let config = StoreConfig::default()
        .namespace("myapp_ratelimit")
        .redis(&RedisConfig::new(&url))?;
    let store: Arc<dyn RatelimitStore> = Arc::new(RedisStore::new(config)?);

    let key = "127.0.0.1";
    let mut record = match store.get(key)? {
        Some(record) if !record.expired_at(Utc::now()) => record,
        _ => Ratelimit::new(3, 3, Utc::now() + Duration::seconds(10)),
    };

    if record.exceeded() {
        println!("{key} is limited until {}", record.reset_at);
    } else {
        record.remaining -= 1;
        store.put(key, &record)?;
        println!("{key} has {} of {} requests left", record.remaining, record.limit);
    }

    println!("stored via {}", store.name());
    Ok(())
}
