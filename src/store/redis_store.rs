#[cfg(feature = "redis")]
mod redis_store_impl {
    use crate::{
        config::RedisConfig,
        error::StoreError,
        store::{HashBackend, HashStore},
    };
    use log::{debug, error, info};
    use redis::{Client, Connection, ConnectionInfo, IntoConnectionInfo};
    use std::{
        sync::mpsc::{self, RecvTimeoutError},
        thread,
        time::Duration,
    };

    /// [`HashStore`] persisted in a Redis hash.
    ///
    /// # Redis Data Structure
    ///
    /// One hash per store:
    /// - Key: the configured namespace
    /// - Field: client identifier
    /// - Value: JSON-encoded [`crate::types::Ratelimit`]
    pub type RedisStore = HashStore<RedisBackend>;

    /// Redis implementation of [`HashBackend`] using `HEXISTS`, `HGET`, `HSET` and `HDEL`.
    ///
    /// Holds one owned [`Client`] for its lifetime and opens a connection per command,
    /// so it can be shared freely between threads and middleware instances.
    /// Commands are not retried; failures surface as [`StoreError::Connection`].
    #[derive(Clone)]
    pub struct RedisBackend {
        /// Redis client for database operations
        client: Client,
    }

    impl RedisBackend {
        /// Creates a new [`RedisBackend`] from connection parameters and tests the connection.
        ///
        /// The whole check (connect, `AUTH`/`SELECT` handshake and `PING`) must finish
        /// within `params.connect_timeout`.
        ///
        /// # Examples
        ///
        /// ```rust,no_run
        /// use ratelimit_store::config::RedisConfig;
        /// use ratelimit_store::store::RedisBackend;
        /// use std::time::Duration;
        ///
        /// let backend = RedisBackend::connect(
        ///     &RedisConfig::new("redis://127.0.0.1:6379/1")
        ///         .password("secret")
        ///         .connect_timeout(Duration::from_secs(5)),
        /// )?;
        /// # Ok::<(), ratelimit_store::error::StoreError>(())
        /// ```
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Configuration`] if:
        /// - URL format is invalid
        /// - Cannot connect to Redis server
        /// - PING command fails
        /// - The server does not answer within the timeout
        pub fn connect(params: &RedisConfig) -> Result<Self, StoreError> {
            let info = connection_info(params)?;
            let client = Client::open(info).map_err(|err| {
                StoreError::Configuration(format!("invalid redis connection parameters: {err}"))
            })?;

            if let Err(reason) = health_check(&client, params.connect_timeout) {
                error!("Redis health check failed for {}: {}", params.url, reason);
                return Err(StoreError::Configuration(reason));
            }

            info!("Connected to Redis at {}", params.url);
            Ok(Self { client })
        }

        /// Wraps an existing client. No health check is performed.
        pub fn from_client(client: Client) -> Self {
            Self { client }
        }

        pub fn client(&self) -> &Client {
            &self.client
        }

        fn connection(&self) -> Result<Connection, StoreError> {
            Ok(self.client.get_connection()?)
        }
    }

    /// Runs [`ping`] on a worker thread and gives up after `timeout`.
    ///
    /// redis-rs only bounds the TCP connect, so a server that accepts and then stays
    /// silent would block the handshake forever. A worker abandoned here exits once the
    /// server closes the socket.
    fn health_check(client: &Client, timeout: Duration) -> Result<(), String> {
        let (tx, rx) = mpsc::channel();
        let client = client.clone();
        thread::Builder::new()
            .name("redis-health-check".to_string())
            .spawn(move || {
                let _ = tx.send(ping(&client, timeout));
            })
            .map_err(|err| format!("failed to start redis health check: {err}"))?;

        match rx.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("redis health check failed: {err}")),
            Err(RecvTimeoutError::Timeout) => {
                Err(format!("redis did not answer PING within {timeout:?}"))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err("redis health check aborted".to_string())
            }
        }
    }

    fn ping(client: &Client, timeout: Duration) -> redis::RedisResult<()> {
        let mut conn = client.get_connection_with_timeout(timeout)?;
        conn.set_read_timeout(Some(timeout))?;
        conn.set_write_timeout(Some(timeout))?;

        let pong: String = redis::cmd("PING").query(&mut conn)?;
        debug!("Redis answered PING with {}", pong);
        Ok(())
    }

    /// Resolves the URL and applies the explicit credential and database overrides.
    fn connection_info(params: &RedisConfig) -> Result<ConnectionInfo, StoreError> {
        let mut info = params.url.as_str().into_connection_info().map_err(|err| {
            StoreError::Configuration(format!("invalid redis url {}: {err}", params.url))
        })?;

        if let Some(username) = &params.username {
            info.redis.username = Some(username.clone());
        }
        if let Some(password) = &params.password {
            info.redis.password = Some(password.clone());
        }
        if let Some(db) = params.db {
            info.redis.db = db;
        }

        Ok(info)
    }

    impl HashBackend for RedisBackend {
        fn name(&self) -> &'static str {
            "redis provider"
        }

        fn hexists(&self, namespace: &str, field: &str) -> Result<bool, StoreError> {
            let mut conn = self.connection()?;
            let exists = redis::cmd("HEXISTS")
                .arg(namespace)
                .arg(field)
                .query(&mut conn)?;
            Ok(exists)
        }

        /// Fetched as bytes so that non UTF-8 data reaches the decoder instead of failing
        /// as a type error.
        fn hget(&self, namespace: &str, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
            let mut conn = self.connection()?;
            let value = redis::cmd("HGET")
                .arg(namespace)
                .arg(field)
                .query(&mut conn)?;
            Ok(value)
        }

        fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<(), StoreError> {
            let mut conn = self.connection()?;
            redis::cmd("HSET")
                .arg(namespace)
                .arg(field)
                .arg(value)
                .query::<()>(&mut conn)?;
            Ok(())
        }

        fn hdel(&self, namespace: &str, field: &str) -> Result<bool, StoreError> {
            let mut conn = self.connection()?;
            let removed: i64 = redis::cmd("HDEL")
                .arg(namespace)
                .arg(field)
                .query(&mut conn)?;
            Ok(removed > 0)
        }
    }

}

#[cfg(feature = "redis")]
pub use redis_store_impl::{RedisBackend, RedisStore};
