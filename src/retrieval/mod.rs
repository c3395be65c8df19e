//! Windowed, session-paged retrieval
//!
//! This module holds the retrieval core:
//! - `session` hands out per-window session ids
//! - `drain` empties one window through one session
//! - `orchestrator` walks every window of a date range
//! - `decode` optionally parses embedded payloads
//! - `params` clamps caller input before a run

mod decode;
mod drain;
mod orchestrator;
mod params;
mod session;

pub use decode::{DecodeError, RecordDecoder};
pub use drain::{DrainCursor, DrainOutcome, DrainReport, DrainSettings, DrainState, SessionDrainer};
pub use orchestrator::{
    RetrievalOptions, RetrievalOrchestrator, RetrievalStats, RetrievalSummary, WindowBatch,
};
pub use params::{RetrievalParams, RetrievalPlan};
pub use session::{SessionId, SessionIdGenerator};
