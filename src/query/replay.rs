//! Offline replay of a captured audit log
//!
//! `ReplayExecutor` serves a fixed record set through the same paged,
//! session-scoped contract as the remote service:
//! - records are matched against the request window by `CreationDate`
//! - each session id keeps its own server-side cursor
//! - a session never yields more than the configured session cap, while
//!   the declared interval total still reports every matching record
//!
//! Captures are NDJSON, one `AuditRecord` per line.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use super::{AuditRecord, PageResult, QueryError, QueryExecutor, QueryRequest};
use crate::constants::limits::{MAX_PAGE_SIZE, MAX_SESSION_SIZE};
use crate::error::{Error, Result};
use crate::retrieval::SessionId;

/// In-memory stand-in for the remote audit-log endpoint.
pub struct ReplayExecutor {
    /// Records ordered by creation date
    records: Vec<AuditRecord>,
    /// Records a single session may return
    session_limit: usize,
    /// Per-session position into the window's matches
    cursors: Mutex<HashMap<SessionId, usize>>,
    /// Empty responses still to be injected before serving data
    pending_empty: AtomicUsize,
    /// Total calls served
    calls: AtomicUsize,
}

impl ReplayExecutor {
    /// Create a replay backend over `records`
    pub fn new(mut records: Vec<AuditRecord>) -> Self {
        records.sort_by_key(|r| r.creation_date);
        Self {
            records,
            session_limit: MAX_SESSION_SIZE as usize,
            cursors: Mutex::new(HashMap::new()),
            pending_empty: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Override the per-session record cap
    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.session_limit = limit.max(1);
        self
    }

    /// Answer the next `count` calls with empty pages
    pub fn with_empty_responses(self, count: usize) -> Self {
        self.pending_empty.store(count, Ordering::SeqCst);
        self
    }

    /// Parse an NDJSON capture; blank lines are skipped
    pub fn from_ndjson_str(content: &str) -> Result<Self> {
        let mut records = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: AuditRecord = serde_json::from_str(line).map_err(|e| {
                Error::InvalidData(format!("line {}: {}", lineno + 1, e))
            })?;
            records.push(record);
        }
        debug!("Loaded {} replay records", records.len());
        Ok(Self::new(records))
    }

    /// Load an NDJSON capture from disk
    pub async fn from_ndjson_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read replay source {}: {}", path.display(), e),
            ))
        })?;
        Self::from_ndjson_str(&content)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of query calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Records whose creation date falls inside the request window
    fn matching(&self, request: &QueryRequest) -> &[AuditRecord] {
        let lo = self
            .records
            .partition_point(|r| r.creation_date < request.window.start);
        let hi = self
            .records
            .partition_point(|r| r.creation_date < request.window.end);
        &self.records[lo..hi.max(lo)]
    }

    /// Sessions with a live cursor
    pub fn open_sessions(&self) -> usize {
        self.cursors.lock().len()
    }

    fn take_injected_empty(&self) -> bool {
        self.pending_empty
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl QueryExecutor for ReplayExecutor {
    async fn query(&self, request: &QueryRequest) -> std::result::Result<PageResult, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.page_size == 0 {
            return Err(QueryError::Rejected("page size must be at least 1".into()));
        }
        if self.take_injected_empty() {
            trace!(session = %request.session_id, "Injected empty response");
            return Ok(PageResult::empty());
        }

        let matching = self.matching(request);
        let declared = matching.len() as u64;
        let visible = matching.len().min(self.session_limit);
        let page_size = request.page_size.min(MAX_PAGE_SIZE);

        let page = {
            let mut cursors = self.cursors.lock();
            let cursor = cursors.entry(request.session_id.clone()).or_insert(0);
            let from = (*cursor).min(visible);
            let to = (from + page_size).min(visible);
            *cursor = to;
            matching[from..to].to_vec()
        };

        trace!(
            session = %request.session_id,
            window = %request.window,
            returned = page.len(),
            declared,
            "Replay page served"
        );

        if page.is_empty() {
            return Ok(PageResult::empty());
        }
        Ok(PageResult::new(page, declared))
    }

    fn release(&self, session_id: &SessionId) {
        if self.cursors.lock().remove(session_id).is_some() {
            trace!(session = %session_id, "Replay session released");
        }
    }
}
