use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quota state for a single caller, as persisted by a [`crate::store::RatelimitStore`].
///
/// The store treats this as an opaque record: it only encodes, decodes and copies it.
/// How `remaining` is consumed and when the window rolls over is up to the middleware.
///
/// On the wire the record is JSON with field names preserved, e.g.
/// `{"limit":10,"remaining":5,"reset_at":"2024-01-01T00:00:00Z"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratelimit {
    /// Maximum number of requests allowed within one window
    pub limit: u64,
    /// Requests still allowed before `reset_at`
    pub remaining: u64,
    /// Instant at which the window resets
    pub reset_at: DateTime<Utc>,
}

impl Ratelimit {
    pub fn new(limit: u64, remaining: u64, reset_at: DateTime<Utc>) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Returns `true` once the caller has no quota left in the current window.
    pub fn exceeded(&self) -> bool {
        self.remaining == 0
    }

    /// Returns `true` if the window has already rolled over at `now`.
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }

    pub(crate) fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub(crate) fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
