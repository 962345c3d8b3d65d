use std::fmt;
#[cfg(feature = "redis")]
use std::time::Duration;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "chi_ratelimit";

/// Configuration for a [`crate::store::HashStore`].
///
/// Every field has a named builder method; calling one twice keeps the last value.
/// Validation happens in [`crate::store::HashStore::new`].
///
/// # Examples
///
/// ```rust
/// use ratelimit_store::config::StoreConfig;
/// use ratelimit_store::store::{HashStore, MemoryBackend};
///
/// let store = HashStore::new(
///     StoreConfig::default()
///         .namespace("myapp_ratelimit")
///         .refresh_on_read(false)
///         .backend(MemoryBackend::new()),
/// )
/// .unwrap();
/// assert_eq!(store.namespace(), "myapp_ratelimit");
/// ```
#[derive(Clone)]
pub struct StoreConfig<B> {
    /// Hash name under which every entry of the store lives
    pub namespace: String,
    /// Re-persist each record after a successful read.
    /// Turning this off halves the cost of reads for read-heavy deployments.
    pub refresh_on_read: bool,
    /// Handle to the backing store
    pub backend: Option<B>,
}

impl<B> Default for StoreConfig<B> {
    /// Creates a default store configuration.
    ///
    /// # Default Values
    ///
    /// - `namespace`: [`DEFAULT_NAMESPACE`]
    /// - `refresh_on_read`: `true`
    /// - `backend`: none, must be supplied before building the store
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            refresh_on_read: true,
            backend: None,
        }
    }
}

impl<B> StoreConfig<B> {
    /// Sets the namespace (hash name) for all entries.
    pub fn namespace(mut self, value: &str) -> Self {
        self.namespace = value.to_string();
        self
    }

    /// Enables or disables the write-back performed by every successful `get`.
    pub fn refresh_on_read(mut self, value: bool) -> Self {
        self.refresh_on_read = value;
        self
    }

    /// Sets a pre-built backend handle. Replaces any backend set before.
    pub fn backend(mut self, backend: B) -> Self {
        self.backend = Some(backend);
        self
    }
}

impl<B> fmt::Debug for StoreConfig<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("namespace", &self.namespace)
            .field("refresh_on_read", &self.refresh_on_read)
            .field("backend", &self.backend.is_some())
            .finish()
    }
}

#[cfg(feature = "redis")]
impl StoreConfig<crate::store::RedisBackend> {
    /// Connects to Redis with `params` and installs the resulting backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StoreError::Configuration`] if the parameters are invalid
    /// or the server does not answer `PING` within `params.connect_timeout`.
    ///
    /// ```rust,no_run
    /// use ratelimit_store::config::{RedisConfig, StoreConfig};
    /// use ratelimit_store::store::RedisStore;
    ///
    /// let config = StoreConfig::default().redis(&RedisConfig::new("redis://127.0.0.1/0"))?;
    /// let store = RedisStore::new(config)?;
    /// # Ok::<(), ratelimit_store::error::StoreError>(())
    /// ```
    pub fn redis(self, params: &RedisConfig) -> Result<Self, crate::error::StoreError> {
        let backend = crate::store::RedisBackend::connect(params)?;
        Ok(self.backend(backend))
    }
}

/// Connection parameters for a Redis backend.
///
/// `username`, `password` and `db` override whatever the URL carries.
///
/// # URL Format
///
/// `redis://[<username>][:<password>@]<hostname>[:port][/<db>]`
#[cfg(feature = "redis")]
#[derive(Clone)]
pub struct RedisConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db: Option<i64>,
    /// Upper bound on connecting and answering the initial `PING`
    pub connect_timeout: Duration,
}

#[cfg(feature = "redis")]
impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1/".to_string(),
            username: None,
            password: None,
            db: None,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(feature = "redis")]
impl RedisConfig {
    pub fn new(url: &str) -> Self {
        Self::default().url(url)
    }

    pub fn url(mut self, value: &str) -> Self {
        self.url = value.to_string();
        self
    }

    pub fn username(mut self, value: &str) -> Self {
        self.username = Some(value.to_string());
        self
    }

    pub fn password(mut self, value: &str) -> Self {
        self.password = Some(value.to_string());
        self
    }

    pub fn db(mut self, value: i64) -> Self {
        self.db = Some(value);
        self
    }

    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }
}

#[cfg(feature = "redis")]
impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("db", &self.db)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
