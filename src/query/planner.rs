use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Half-open `[start, end)` range the caller wants enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range; an inverted pair collapses to the empty range at `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: start.min(end),
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// One sub-range queried under a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Splits a date range into contiguous fixed-width windows.
#[derive(Debug, Clone, Copy)]
pub struct WindowPlanner {
    interval: Duration,
}

impl WindowPlanner {
    /// Create a planner; the interval must be strictly positive.
    pub fn new(interval: Duration) -> Result<Self> {
        if interval <= Duration::zero() {
            return Err(Error::Validation(format!(
                "window interval must be positive, got {}",
                interval
            )));
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Lazily plan the windows covering `range`.
    ///
    /// The returned iterator is cheap to clone, so a plan can be walked more
    /// than once (for example to count windows before draining them).
    pub fn plan(&self, range: DateRange) -> Windows {
        Windows {
            cursor: range.start,
            end: range.end,
            interval: self.interval,
        }
    }
}

/// Iterator over the windows of one plan.
#[derive(Debug, Clone)]
pub struct Windows {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.cursor >= self.end {
            return None;
        }
        let start = self.cursor;
        let end = start
            .checked_add_signed(self.interval)
            .map_or(self.end, |e| e.min(self.end));
        self.cursor = end;
        Some(Window { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = remaining_windows(self.end - self.cursor, self.interval);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}

/// `ceil(span / interval)`, zero for an empty span
fn remaining_windows(span: Duration, interval: Duration) -> usize {
    if span <= Duration::zero() {
        return 0;
    }
    match (span.num_nanoseconds(), interval.num_nanoseconds()) {
        (Some(span), Some(step)) => div_ceil(span, step) as usize,
        _ => {
            // Beyond ~292 years of nanoseconds; millisecond precision suffices
            let span = span.num_milliseconds();
            let step = interval.num_milliseconds().max(1);
            div_ceil(span, step) as usize
        }
    }
}

fn div_ceil(span: i64, step: i64) -> i64 {
    span / step + i64::from(span % step != 0)
}
