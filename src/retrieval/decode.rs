//! Decoding of embedded audit payloads
//!
//! The service occasionally emits truncated or unterminated `AuditData`
//! strings. Decoding as a pipeline stage drops such records, counts them,
//! and keeps the stream going.

use futures::{future, Stream, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::events::{EventSink, RetrievalEvent};
use crate::query::AuditRecord;

/// A payload that does not parse as JSON.
#[derive(Debug, Error)]
#[error("malformed {record_type} payload: {source}")]
pub struct DecodeError {
    pub record_type: String,
    #[source]
    pub source: serde_json::Error,
}

/// Parses `AuditData` payloads, skipping and counting the malformed ones.
pub struct RecordDecoder {
    skipped: AtomicU64,
    sink: Arc<dyn EventSink>,
}

impl RecordDecoder {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            skipped: AtomicU64::new(0),
            sink,
        }
    }

    /// Parse one record's payload.
    pub fn decode(&self, record: &AuditRecord) -> Result<Value, DecodeError> {
        serde_json::from_str(&record.audit_data).map_err(|source| DecodeError {
            record_type: record.record_type.clone(),
            source,
        })
    }

    /// Parse one record's payload, or count it as skipped.
    pub fn decode_or_skip(&self, record: &AuditRecord) -> Option<Value> {
        match self.decode(record) {
            Ok(payload) => Some(payload),
            Err(err) => {
                let skipped_total = self.skipped.fetch_add(1, Ordering::SeqCst) + 1;
                self.sink.emit(&RetrievalEvent::PayloadSkipped {
                    record_type: err.record_type.clone(),
                    skipped_total,
                    error: err.source.to_string(),
                });
                None
            }
        }
    }

    /// Decode every record of `records`, dropping malformed ones.
    pub fn decode_stream<'a, S>(&'a self, records: S) -> impl Stream<Item = Value> + Send + 'a
    where
        S: Stream<Item = AuditRecord> + Send + 'a,
    {
        records.filter_map(move |record| future::ready(self.decode_or_skip(&record)))
    }

    /// Records skipped so far
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use chrono::Utc;

    fn record(payload: &str) -> AuditRecord {
        AuditRecord {
            record_type: "AzureActiveDirectory".into(),
            creation_date: Utc::now(),
            user_ids: String::new(),
            operations: "UserLoggedIn".into(),
            audit_data: payload.into(),
            identity: None,
        }
    }

    #[test]
    fn test_decode_error_names_record_type() {
        let decoder = RecordDecoder::new(Arc::new(NullSink));
        let err = decoder.decode(&record("{\"Id\":")).unwrap_err();
        assert!(err.to_string().starts_with("malformed AzureActiveDirectory payload"));
        // Plain decode does not count
        assert_eq!(decoder.skipped(), 0);
    }

    #[test]
    fn test_skip_counter_accumulates() {
        let decoder = RecordDecoder::new(Arc::new(NullSink));
        assert!(decoder.decode_or_skip(&record("{\"Id\":\"a\"}")).is_some());
        assert!(decoder.decode_or_skip(&record("{\"Id\":\"b")).is_none());
        assert!(decoder.decode_or_skip(&record("")).is_none());
        assert_eq!(decoder.skipped(), 2);
    }
}
