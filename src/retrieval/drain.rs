//! Draining one window through a single query session
//!
//! A window is drained by asking for pages under one session id until the
//! cumulative record count reaches the total the service declares for the
//! window, or until the retry budget for empty responses runs out. The
//! service gives no other end-of-session signal, and it may answer with
//! empty pages before it starts returning data, so emptiness alone never
//! ends a drain.

use futures::Stream;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::events::{EmptyReason, EventSink, RetrievalEvent};
use crate::query::{
    AuditRecord, ContinuationMode, PageResult, QueryError, QueryExecutor, QueryRequest, Window,
};

use super::SessionId;

/// Limits applied while draining a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainSettings {
    /// Records requested per page
    pub page_size: usize,
    /// Most records a single session can return
    pub session_limit: u64,
    /// Empty responses tolerated before abandoning the window
    pub retry_limit: u32,
    /// Upper bound on one query call
    pub query_timeout: Duration,
}

/// Counters of one window's drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainState {
    /// Empty responses seen so far
    pub retries: u32,
    /// Records received in this session; `None` until the first non-empty page
    pub session_record_count: Option<u64>,
    /// Declared total for the window, clamped to the session limit
    pub interval_result_count: u64,
}

impl DrainState {
    /// Records received, treating "nothing yet" as zero
    pub fn received(&self) -> u64 {
        self.session_record_count.unwrap_or(0)
    }

    /// Whether the declared total has been reached
    pub fn reached_total(&self) -> bool {
        self.session_record_count
            .map_or(false, |n| n >= self.interval_result_count)
    }

    fn should_continue(&self, retry_limit: u32) -> bool {
        self.retries < retry_limit && !self.reached_total()
    }
}

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrainOutcome {
    /// Every declared record (up to the session limit) was received
    Drained,
    /// The retry budget ran out first
    RetryExhausted,
    /// The consumer stopped before the drain finished
    Abandoned,
}

/// Final account of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrainReport {
    pub window: Window,
    pub session_id: SessionId,
    pub state: DrainState,
    pub outcome: DrainOutcome,
    /// The declared total was clamped to the session limit
    pub capacity_exceeded: bool,
}

/// Drains windows against a query executor.
pub struct SessionDrainer {
    executor: Arc<dyn QueryExecutor>,
    settings: DrainSettings,
    sink: Arc<dyn EventSink>,
}

impl SessionDrainer {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        settings: DrainSettings,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            executor,
            settings,
            sink,
        }
    }

    /// Start draining `window` under `session_id`; pages are pulled from the cursor.
    pub fn open(&self, window: Window, session_id: SessionId) -> DrainCursor<'_> {
        DrainCursor {
            drainer: self,
            window,
            session_id,
            state: DrainState::default(),
            capacity_exceeded: false,
            outcome: None,
        }
    }

    /// Lazily yield the window's records in session order.
    pub fn drain(
        &self,
        window: Window,
        session_id: SessionId,
    ) -> impl Stream<Item = AuditRecord> + Send + '_ {
        async_stream::stream! {
            let mut cursor = self.open(window, session_id);
            while let Some(page) = cursor.next_page().await {
                for record in page {
                    yield record;
                }
            }
        }
    }

    /// Drain the whole window into memory.
    pub async fn drain_all(
        &self,
        window: Window,
        session_id: SessionId,
    ) -> (Vec<AuditRecord>, DrainReport) {
        let mut cursor = self.open(window, session_id);
        let mut records = Vec::new();
        while let Some(page) = cursor.next_page().await {
            records.extend(page);
        }
        (records, cursor.into_report())
    }

    async fn fetch(&self, request: &QueryRequest) -> Result<PageResult, EmptyReason> {
        match tokio::time::timeout(self.settings.query_timeout, self.executor.query(request)).await
        {
            Ok(Ok(page)) if page.is_empty() => Err(EmptyReason::NoRecords),
            Ok(Ok(page)) => Ok(page),
            Ok(Err(QueryError::Timeout(elapsed))) => {
                debug!(session = %request.session_id, "Service timed out after {:?}", elapsed);
                Err(EmptyReason::Timeout)
            }
            Ok(Err(e)) => {
                warn!(session = %request.session_id, "Query failed: {}", e);
                Err(EmptyReason::QueryFailed(e.to_string()))
            }
            Err(_) => Err(EmptyReason::Timeout),
        }
    }
}

/// In-progress drain of one window.
pub struct DrainCursor<'a> {
    drainer: &'a SessionDrainer,
    window: Window,
    session_id: SessionId,
    state: DrainState,
    capacity_exceeded: bool,
    outcome: Option<DrainOutcome>,
}

impl<'a> DrainCursor<'a> {
    /// Fetch the next non-empty page, or `None` once the window is done.
    ///
    /// A returned page never takes the session past the (clamped) declared
    /// total; surplus records the service sends are dropped.
    pub async fn next_page(&mut self) -> Option<Vec<AuditRecord>> {
        let settings = self.drainer.settings;
        loop {
            if self.outcome.is_some() {
                return None;
            }
            if !self.state.should_continue(settings.retry_limit) {
                self.finish();
                return None;
            }

            let request = QueryRequest {
                window: self.window,
                session_id: self.session_id.clone(),
                page_size: settings.page_size,
                mode: ContinuationMode::ReturnLargeSet,
            };

            let page = match self.drainer.fetch(&request).await {
                Ok(page) => page,
                Err(reason) => {
                    self.state.retries += 1;
                    self.drainer.sink.emit(&RetrievalEvent::EmptyResponse {
                        session_id: self.session_id.clone(),
                        window: self.window,
                        attempt: self.state.retries,
                        retry_limit: settings.retry_limit,
                        reason,
                    });
                    continue;
                }
            };

            let mut expected = page.interval_total;
            if expected > settings.session_limit {
                expected = settings.session_limit;
                if !self.capacity_exceeded {
                    self.capacity_exceeded = true;
                    self.drainer.sink.emit(&RetrievalEvent::SessionCapacityExceeded {
                        session_id: self.session_id.clone(),
                        window: self.window,
                        declared_total: page.interval_total,
                        session_limit: settings.session_limit,
                    });
                }
            }
            self.state.interval_result_count = expected;

            let received = self.state.received();
            let remaining = expected.saturating_sub(received);
            let mut records = page.records;
            if records.len() as u64 > remaining {
                trace!(
                    session = %self.session_id,
                    "Dropping {} records past the declared total",
                    records.len() as u64 - remaining
                );
                records.truncate(remaining as usize);
            }
            self.state.session_record_count = Some(received + records.len() as u64);

            if !records.is_empty() {
                return Some(records);
            }
        }
    }

    fn finish(&mut self) {
        let outcome = if self.state.reached_total() {
            DrainOutcome::Drained
        } else {
            self.drainer.sink.emit(&RetrievalEvent::RetryExhausted {
                session_id: self.session_id.clone(),
                window: self.window,
                retries: self.state.retries,
                received: self.state.received(),
                expected: self.state.interval_result_count,
            });
            DrainOutcome::RetryExhausted
        };
        self.outcome = Some(outcome);
        self.drainer.executor.release(&self.session_id);
    }

    /// Close the cursor and report what it saw.
    pub fn into_report(self) -> DrainReport {
        DrainReport {
            window: self.window,
            session_id: self.session_id.clone(),
            state: self.state,
            outcome: self.outcome.unwrap_or(DrainOutcome::Abandoned),
            capacity_exceeded: self.capacity_exceeded,
        }
    }
}

impl Drop for DrainCursor<'_> {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            self.drainer.executor.release(&self.session_id);
        }
    }
}
