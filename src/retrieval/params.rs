//! Caller-facing parameters and their clamping
//!
//! Out-of-range input is corrected here, before any window is planned:
//! - start earlier than the retention floor is raised to the floor
//! - end later than now is lowered to now
//! - an inverted range collapses to the empty range at its end
//! - page, session, interval and retry settings are pulled into range

use chrono::{DateTime, Duration, Utc};
use std::time::Duration as StdDuration;
use tracing::warn;

use crate::config::RetrievalSettings;
use crate::constants::{defaults, limits};
use crate::query::DateRange;

use super::orchestrator::RetrievalOptions;

/// Parameters as supplied by the caller, before clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalParams {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub interval_minutes: i64,
    pub result_size: usize,
    pub session_size: u64,
    pub retry_limit: u32,
    pub lookback_days: i64,
    pub query_timeout_secs: u64,
    pub max_concurrent_windows: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            interval_minutes: defaults::INTERVAL_MINUTES,
            result_size: defaults::RESULT_SIZE,
            session_size: defaults::SESSION_SIZE,
            retry_limit: defaults::RETRY_LIMIT,
            lookback_days: limits::MAX_LOOKBACK_DAYS,
            query_timeout_secs: defaults::QUERY_TIMEOUT_SECS,
            max_concurrent_windows: defaults::MAX_CONCURRENT_WINDOWS,
        }
    }
}

/// A clamped range plus the options to retrieve it with.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalPlan {
    pub range: DateRange,
    pub options: RetrievalOptions,
}

impl RetrievalParams {
    pub fn from_settings(settings: &RetrievalSettings) -> Self {
        Self {
            start: None,
            end: None,
            interval_minutes: settings.interval_minutes,
            result_size: settings.result_size,
            session_size: settings.session_size,
            retry_limit: settings.retry_limit,
            lookback_days: settings.lookback_days,
            query_timeout_secs: settings.query_timeout_secs,
            max_concurrent_windows: settings.max_concurrent_windows,
        }
    }

    /// Resolve defaults and clamp everything against `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> RetrievalPlan {
        let lookback = self.lookback_days.clamp(1, limits::MAX_LOOKBACK_DAYS);
        let floor = now - Duration::days(lookback);

        let mut start = self.start.unwrap_or(floor);
        if start < floor {
            warn!(
                "Start {} is beyond the {}-day retention window; using {}",
                start.to_rfc3339(),
                lookback,
                floor.to_rfc3339()
            );
            start = floor;
        }

        let mut end = self.end.unwrap_or(now);
        if end > now {
            warn!("End {} is in the future; using now", end.to_rfc3339());
            end = now;
        }

        if start > end {
            warn!(
                "Start {} is after end {}; nothing to retrieve",
                start.to_rfc3339(),
                end.to_rfc3339()
            );
        }

        let options = RetrievalOptions {
            interval: Duration::minutes(self.interval_minutes.clamp(1, lookback * 24 * 60)),
            page_size: self.result_size.clamp(1, limits::MAX_PAGE_SIZE),
            session_limit: self.session_size.clamp(1, limits::MAX_SESSION_SIZE),
            retry_limit: self.retry_limit.max(1),
            query_timeout: StdDuration::from_secs(self.query_timeout_secs.max(1)),
            max_concurrent_windows: self.max_concurrent_windows.max(1),
        };

        RetrievalPlan {
            range: DateRange::new(start, end),
            options,
        }
    }
}
