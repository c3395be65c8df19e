use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier tying the pages of one window's drain together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Hands out a fresh session id per window.
///
/// Ids combine the wall clock (microsecond resolution) with a per-generator
/// sequence number, so they sort in issue order and never repeat within a
/// run even when the clock does not advance between windows.
#[derive(Debug)]
pub struct SessionIdGenerator {
    prefix: String,
    sequence: AtomicU64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self::with_prefix("auditsweep")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> SessionId {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
        SessionId(format!("{}-{}-{:06}", self.prefix, stamp, seq))
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
