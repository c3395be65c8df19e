//! Top-level retrieval over a full date range
//!
//! The orchestrator plans windows, gives each one a fresh session id, drains
//! it, and forwards the records in interval order. A window that exhausts its
//! retry budget is reported and skipped past; nothing stops the run short of
//! the consumer dropping the stream.

use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::events::{EventSink, Progress, RetrievalEvent};
use crate::error::Result;
use crate::query::{AuditRecord, DateRange, QueryExecutor, Window, WindowPlanner, Windows};

use super::drain::{DrainOutcome, DrainReport, DrainSettings, SessionDrainer};
use super::session::SessionIdGenerator;

/// Tunables of a retrieval run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalOptions {
    /// Width of each window
    pub interval: chrono::Duration,
    /// Records requested per page
    pub page_size: usize,
    /// Most records one session may return
    pub session_limit: u64,
    /// Empty responses tolerated per window
    pub retry_limit: u32,
    /// Upper bound on one query call
    pub query_timeout: Duration,
    /// Windows drained at once; 1 streams strictly sequentially
    pub max_concurrent_windows: usize,
}

impl RetrievalOptions {
    fn drain_settings(&self) -> DrainSettings {
        DrainSettings {
            page_size: self.page_size,
            session_limit: self.session_limit,
            retry_limit: self.retry_limit,
            query_timeout: self.query_timeout,
        }
    }
}

/// Records delivered together for one window.
///
/// Sequential runs yield one batch per page; concurrent runs buffer each
/// window and yield it as a single batch once every earlier window is out.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch {
    /// Zero-based position of the window in the plan
    pub window_index: usize,
    pub window: Window,
    pub records: Vec<AuditRecord>,
}

/// Running totals, updated as windows finish.
#[derive(Debug, Default)]
pub struct RetrievalStats {
    windows_planned: AtomicUsize,
    windows_completed: AtomicUsize,
    windows_exhausted: AtomicUsize,
    windows_over_capacity: AtomicUsize,
    total_records: AtomicU64,
    retries: AtomicU64,
}

/// Point-in-time copy of [`RetrievalStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetrievalSummary {
    pub windows_planned: usize,
    pub windows_completed: usize,
    pub windows_exhausted: usize,
    pub windows_over_capacity: usize,
    pub total_records: u64,
    pub retries: u64,
}

impl RetrievalStats {
    pub fn total_records(&self) -> u64 {
        self.total_records.load(Ordering::SeqCst)
    }

    pub fn summary(&self) -> RetrievalSummary {
        RetrievalSummary {
            windows_planned: self.windows_planned.load(Ordering::SeqCst),
            windows_completed: self.windows_completed.load(Ordering::SeqCst),
            windows_exhausted: self.windows_exhausted.load(Ordering::SeqCst),
            windows_over_capacity: self.windows_over_capacity.load(Ordering::SeqCst),
            total_records: self.total_records.load(Ordering::SeqCst),
            retries: self.retries.load(Ordering::SeqCst),
        }
    }

    fn record_window(&self, report: &DrainReport) {
        self.windows_completed.fetch_add(1, Ordering::SeqCst);
        self.total_records
            .fetch_add(report.state.received(), Ordering::SeqCst);
        self.retries
            .fetch_add(report.state.retries as u64, Ordering::SeqCst);
        if report.outcome == DrainOutcome::RetryExhausted {
            self.windows_exhausted.fetch_add(1, Ordering::SeqCst);
        }
        if report.capacity_exceeded {
            self.windows_over_capacity.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Drives window planning and draining over a date range.
pub struct RetrievalOrchestrator {
    planner: WindowPlanner,
    drainer: SessionDrainer,
    options: RetrievalOptions,
    sessions: SessionIdGenerator,
    sink: Arc<dyn EventSink>,
    stats: Arc<RetrievalStats>,
}

impl RetrievalOrchestrator {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        options: RetrievalOptions,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let planner = WindowPlanner::new(options.interval)?;
        let drainer = SessionDrainer::new(executor, options.drain_settings(), sink.clone());
        Ok(Self {
            planner,
            drainer,
            options,
            sessions: SessionIdGenerator::new(),
            sink,
            stats: Arc::new(RetrievalStats::default()),
        })
    }

    /// Totals accumulated by every run of this orchestrator
    pub fn stats(&self) -> Arc<RetrievalStats> {
        self.stats.clone()
    }

    /// Records of `range`, lazily, in interval order.
    pub fn run(&self, range: DateRange) -> BoxStream<'_, AuditRecord> {
        self.run_batches(range)
            .flat_map(|batch| stream::iter(batch.records))
            .boxed()
    }

    /// Records of `range` grouped per page (sequential) or per window (concurrent).
    pub fn run_batches(&self, range: DateRange) -> BoxStream<'_, WindowBatch> {
        if self.options.max_concurrent_windows > 1 {
            self.run_concurrent(range)
        } else {
            self.run_sequential(range)
        }
    }

    fn start_run(&self, range: DateRange) -> (Windows, usize) {
        let windows = self.planner.plan(range);
        let total = windows.len();
        self.stats.windows_planned.fetch_add(total, Ordering::SeqCst);
        self.sink.emit(&RetrievalEvent::RunStarted {
            range,
            total_windows: total,
        });
        (windows, total)
    }

    fn start_window(&self, index: usize, total: usize) {
        self.sink
            .emit(&RetrievalEvent::Progress(Progress::new(index + 1, total)));
    }

    fn finish_window(&self, report: DrainReport) {
        self.stats.record_window(&report);
        self.sink.emit(&RetrievalEvent::WindowCompleted(report));
    }

    fn finish_run(&self, total: usize) {
        self.sink.emit(&RetrievalEvent::RunCompleted {
            total_windows: total,
            total_records: self.stats.total_records(),
        });
    }

    fn run_sequential(&self, range: DateRange) -> BoxStream<'_, WindowBatch> {
        async_stream::stream! {
            let (windows, total) = self.start_run(range);
            for (index, window) in windows.enumerate() {
                self.start_window(index, total);
                let session_id = self.sessions.next_id();
                debug!(session = %session_id, "Draining window {}", window);

                let mut cursor = self.drainer.open(window, session_id);
                while let Some(records) = cursor.next_page().await {
                    yield WindowBatch { window_index: index, window, records };
                }
                self.finish_window(cursor.into_report());
            }
            self.finish_run(total);
        }
        .boxed()
    }

    fn run_concurrent(&self, range: DateRange) -> BoxStream<'_, WindowBatch> {
        let limit = self.options.max_concurrent_windows;
        async_stream::stream! {
            let (windows, total) = self.start_run(range);
            let drains = stream::iter(windows.enumerate())
                .map(|(index, window)| async move {
                    self.start_window(index, total);
                    let session_id = self.sessions.next_id();
                    debug!(session = %session_id, "Draining window {}", window);
                    let (records, report) = self.drainer.drain_all(window, session_id).await;
                    self.finish_window(report);
                    WindowBatch { window_index: index, window, records }
                })
                .buffered(limit);
            futures::pin_mut!(drains);
            while let Some(batch) = drains.next().await {
                if !batch.records.is_empty() {
                    yield batch;
                }
            }
            self.finish_run(total);
        }
        .boxed()
    }
}
