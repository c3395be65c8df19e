//! Shared constants for the auditsweep application
//!
//! Centralizes the remote service's hard limits and the caller-facing
//! defaults so parameter clamping and the replay backend agree.

/// Hard limits imposed by the remote audit-log query service
pub mod limits {
    /// Maximum number of records a single page request may return
    pub const MAX_PAGE_SIZE: usize = 5000;

    /// Maximum number of records a single query session may return
    pub const MAX_SESSION_SIZE: u64 = 50_000;

    /// How far back the service retains audit records
    pub const MAX_LOOKBACK_DAYS: i64 = 90;
}

/// Defaults applied when the caller leaves a parameter unset
pub mod defaults {
    /// Width of each retrieval window in minutes
    pub const INTERVAL_MINUTES: i64 = 30;

    /// Records requested per page
    pub const RESULT_SIZE: usize = 100;

    /// Per-session record cap
    pub const SESSION_SIZE: u64 = super::limits::MAX_SESSION_SIZE;

    /// Empty responses tolerated per window before giving up on it
    pub const RETRY_LIMIT: u32 = 3;

    /// Upper bound on a single query call, in seconds
    pub const QUERY_TIMEOUT_SECS: u64 = 60;

    /// Windows drained at the same time
    pub const MAX_CONCURRENT_WINDOWS: usize = 1;
}
