//! Error types for rate limit stores.

/// Boxed error returned by a backing store client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by a [`crate::store::RatelimitStore`].
///
/// A missing entry is not an error: `get` returns `Ok(None)` and `reset` returns
/// `Ok(false)`. Everything below propagates to the caller unchanged, and the caller
/// decides whether to fail open or closed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No usable backend after applying the configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backing store could not be reached or rejected a command.
    #[error("connection to backing store failed")]
    Connection(#[source] BoxError),

    /// A record could not be encoded before writing.
    #[error("failed to serialize ratelimit")]
    Serialization(#[source] serde_json::Error),

    /// The stored bytes for `key` do not decode as a ratelimit.
    #[error("corrupt ratelimit data for key {key}")]
    CorruptData {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn connection<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Connection(err.into())
    }

    /// Renders this error followed by each of its sources, `: ` separated.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            rendered.push_str(": ");
            rendered.push_str(&err.to_string());
            source = std::error::Error::source(err);
        }
        rendered
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        Self::connection(err)
    }
}
