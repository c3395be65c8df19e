//! Query boundary against the remote audit-log service
//!
//! This module provides the pieces the retrieval core talks to:
//! - Window planning over a caller-supplied date range
//! - The paged, session-scoped query contract (`QueryExecutor`)
//! - An offline replay backend that emulates server-side sessions

mod executor;
mod planner;
pub mod replay;

pub use executor::QueryExecutor;
pub use planner::{DateRange, Window, WindowPlanner, Windows};
pub use replay::ReplayExecutor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retrieval::SessionId;

/// How the service should treat the session's continuation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuationMode {
    /// Page through the full result set of the session, up to the session cap
    ReturnLargeSet,
}

/// One page request within a session.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Time window the session is scoped to
    pub window: Window,
    /// Identifier correlating every page of one window's drain
    pub session_id: SessionId,
    /// Maximum records to return in this page
    pub page_size: usize,
    /// Continuation behaviour requested from the service
    pub mode: ContinuationMode,
}

/// A single audit event as returned by the service.
///
/// `audit_data` carries the event body as a serialized JSON string; it is
/// decoded lazily by [`crate::retrieval::RecordDecoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuditRecord {
    /// Workload classification of the event
    pub record_type: String,
    /// When the event was recorded
    pub creation_date: DateTime<Utc>,
    /// Users associated with the event
    #[serde(default)]
    pub user_ids: String,
    /// Operations performed
    #[serde(default)]
    pub operations: String,
    /// Serialized event payload
    pub audit_data: String,
    /// Service-side record identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Records of this page, in session order
    pub records: Vec<AuditRecord>,
    /// Total records the service declares for the window and session
    pub interval_total: u64,
}

impl PageResult {
    pub fn new(records: Vec<AuditRecord>, interval_total: u64) -> Self {
        Self {
            records,
            interval_total,
        }
    }

    /// A response carrying no records
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Failures at the query boundary.
///
/// The retrieval core treats every variant like an empty response.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request rejected by service: {0}")]
    Rejected(String),
}
