//! Common test utilities for windowed audit-log retrieval
#![allow(dead_code)]

use async_trait::async_trait;
use auditsweep_core::{
    query::{AuditRecord, PageResult, QueryError, QueryExecutor, QueryRequest, Window},
    retrieval::{DrainSettings, SessionId},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Scripted answer to one query call
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Records plus the declared interval total
    Page(Vec<AuditRecord>, u64),
    Empty,
    Fail(QueryError),
    /// Sleep before answering empty; used to trip the query timeout
    Stall(std::time::Duration),
}

/// Executor answering from per-window scripts; unscripted calls get empty pages
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<DateTime<Utc>, VecDeque<Scripted>>>,
    requests: Mutex<Vec<QueryRequest>>,
    released: Mutex<Vec<SessionId>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers for the window starting at `start`
    pub fn script(self, start: DateTime<Utc>, answers: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .entry(start)
            .or_default()
            .extend(answers);
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Sessions the drainer has released, in order
    pub fn released(&self) -> Vec<SessionId> {
        self.released.lock().clone()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn query(&self, request: &QueryRequest) -> Result<PageResult, QueryError> {
        self.requests.lock().push(request.clone());
        let next = self
            .scripts
            .lock()
            .get_mut(&request.window.start)
            .and_then(|q| q.pop_front())
            .unwrap_or(Scripted::Empty);

        match next {
            Scripted::Page(records, total) => Ok(PageResult::new(records, total)),
            Scripted::Empty => Ok(PageResult::empty()),
            Scripted::Fail(err) => Err(err),
            Scripted::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(PageResult::empty())
            }
        }
    }

    fn release(&self, session_id: &SessionId) {
        self.released.lock().push(session_id.clone());
    }
}

/// Fixed origin all test timestamps are measured from
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

pub fn at(minute: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minute)
}

pub fn window(from: i64, to: i64) -> Window {
    Window {
        start: at(from),
        end: at(to),
    }
}

/// A record created at `ts` whose payload carries `seq`
pub fn record_at(ts: DateTime<Utc>, seq: usize) -> AuditRecord {
    AuditRecord {
        record_type: "ExchangeItem".into(),
        creation_date: ts,
        user_ids: "user@example.com".into(),
        operations: "MailItemsAccessed".into(),
        audit_data: format!(
            "{{\"Id\":\"{}\",\"CreationTime\":\"{}\",\"Operation\":\"MailItemsAccessed\"}}",
            seq,
            ts.to_rfc3339()
        ),
        identity: Some(format!("identity-{}", seq)),
    }
}

/// `count` records inside the window starting at `minute`
pub fn records(minute: i64, count: usize) -> Vec<AuditRecord> {
    (0..count)
        .map(|i| record_at(at(minute) + Duration::milliseconds(i as i64), i))
        .collect()
}

/// Records spread one per `step_secs` seconds over `[from, to)` minutes
pub fn spread(from: i64, to: i64, step_secs: i64) -> Vec<AuditRecord> {
    let mut out = Vec::new();
    let mut ts = at(from);
    let mut seq = 0;
    while ts < at(to) {
        out.push(record_at(ts, seq));
        ts += Duration::seconds(step_secs);
        seq += 1;
    }
    out
}

pub fn drain_settings(page_size: usize, session_limit: u64, retry_limit: u32) -> DrainSettings {
    DrainSettings {
        page_size,
        session_limit,
        retry_limit,
        query_timeout: std::time::Duration::from_secs(5),
    }
}
