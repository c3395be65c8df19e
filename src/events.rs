//! Diagnostic side channel of a retrieval run
//!
//! The retrieval core never logs directly: it emits `RetrievalEvent`s into an
//! `EventSink`. The default `TracingSink` maps them onto tracing levels;
//! `CollectingSink` keeps them in memory for inspection.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::query::{DateRange, Window};
use crate::retrieval::{DrainReport, SessionId};

/// Why a page request produced no records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EmptyReason {
    /// The service answered with zero records
    NoRecords,
    /// The call did not complete within the query timeout
    Timeout,
    /// The executor returned an error
    QueryFailed(String),
}

/// Progress after a window starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// One-based index of the window being drained
    pub current_window: usize,
    pub total_windows: usize,
    /// `current / total * 100`, rounded to two decimals
    pub percent_complete: f64,
}

impl Progress {
    pub fn new(current_window: usize, total_windows: usize) -> Self {
        let percent_complete = if total_windows == 0 {
            100.0
        } else {
            let raw = current_window as f64 / total_windows as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };
        Self {
            current_window,
            total_windows,
            percent_complete,
        }
    }
}

/// Observations emitted while retrieving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RetrievalEvent {
    RunStarted {
        range: DateRange,
        total_windows: usize,
    },
    Progress(Progress),
    /// A page came back empty and counts against the retry budget
    EmptyResponse {
        session_id: SessionId,
        window: Window,
        attempt: u32,
        retry_limit: u32,
        reason: EmptyReason,
    },
    /// The declared total exceeds what one session can return
    SessionCapacityExceeded {
        session_id: SessionId,
        window: Window,
        declared_total: u64,
        session_limit: u64,
    },
    /// The retry budget ran out before the declared total was reached
    RetryExhausted {
        session_id: SessionId,
        window: Window,
        retries: u32,
        received: u64,
        expected: u64,
    },
    WindowCompleted(DrainReport),
    /// A record's payload could not be decoded and was dropped
    PayloadSkipped {
        record_type: String,
        skipped_total: u64,
        error: String,
    },
    RunCompleted {
        total_windows: usize,
        total_records: u64,
    },
}

/// Receiver for retrieval observations.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RetrievalEvent);
}

/// Routes events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &RetrievalEvent) {
        match event {
            RetrievalEvent::RunStarted {
                range,
                total_windows,
            } => info!("Retrieving {} in {} windows", range, total_windows),
            RetrievalEvent::Progress(p) => info!(
                "Window {}/{} ({:.2}%)",
                p.current_window, p.total_windows, p.percent_complete
            ),
            RetrievalEvent::EmptyResponse {
                session_id,
                window,
                attempt,
                retry_limit,
                reason,
            } => debug!(
                session = %session_id,
                "Empty response for {} (attempt {}/{}): {:?}",
                window, attempt, retry_limit, reason
            ),
            RetrievalEvent::SessionCapacityExceeded {
                session_id,
                window,
                declared_total,
                session_limit,
            } => warn!(
                session = %session_id,
                "Window {} declares {} records but a session returns at most {}; \
                 use a shorter interval to retrieve the remainder",
                window, declared_total, session_limit
            ),
            RetrievalEvent::RetryExhausted {
                session_id,
                window,
                retries,
                received,
                expected,
            } => warn!(
                session = %session_id,
                "Giving up on window {} after {} empty responses ({} of {} records)",
                window, retries, received, expected
            ),
            RetrievalEvent::WindowCompleted(report) => debug!(
                session = %report.session_id,
                "Window {} finished: {} of {} records, {} retries",
                report.window,
                report.state.received(),
                report.state.interval_result_count,
                report.state.retries
            ),
            RetrievalEvent::PayloadSkipped {
                record_type,
                skipped_total,
                error,
            } => warn!(
                "Skipped malformed {} payload ({} skipped so far): {}",
                record_type, skipped_total, error
            ),
            RetrievalEvent::RunCompleted {
                total_windows,
                total_records,
            } => info!(
                "Retrieved {} records across {} windows",
                total_records, total_windows
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &RetrievalEvent) {}
}

/// Keeps events in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<RetrievalEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<RetrievalEvent> {
        self.events.lock().clone()
    }

    /// Number of events matching `predicate`
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&RetrievalEvent) -> bool,
    {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &RetrievalEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_rounding() {
        assert_eq!(Progress::new(1, 3).percent_complete, 33.33);
        assert_eq!(Progress::new(2, 3).percent_complete, 66.67);
        assert_eq!(Progress::new(3, 3).percent_complete, 100.0);
        assert_eq!(Progress::new(0, 0).percent_complete, 100.0);
    }

    #[test]
    fn test_collecting_sink_counts() {
        let sink = CollectingSink::new();
        sink.emit(&RetrievalEvent::Progress(Progress::new(1, 2)));
        sink.emit(&RetrievalEvent::RunCompleted {
            total_windows: 2,
            total_records: 0,
        });
        assert_eq!(sink.events().len(), 2);
        assert_eq!(
            sink.count(|e| matches!(e, RetrievalEvent::Progress(_))),
            1
        );
    }
}
