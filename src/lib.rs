//! Complete retrieval of large audit logs from capped query services.
//!
//! The remote service answers time-range queries only, caps every session
//! and every page, and pages through results under a caller-chosen session
//! id. [`retrieval::RetrievalOrchestrator`] splits a date range into windows
//! small enough for one session each, drains every window page by page, and
//! streams the records out in interval order.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod query;
pub mod retrieval;

// Re-export commonly used types
pub use error::{Error, Result};
pub use events::{EventSink, RetrievalEvent, TracingSink};
pub use query::{AuditRecord, DateRange, PageResult, QueryExecutor, QueryRequest, Window, WindowPlanner};
pub use retrieval::{RecordDecoder, RetrievalOrchestrator, RetrievalParams, SessionDrainer};
