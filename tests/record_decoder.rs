mod common;

use auditsweep_core::{
    events::{CollectingSink, RetrievalEvent},
    retrieval::RecordDecoder,
};
use common::*;
use futures::{stream, StreamExt};
use std::sync::Arc;

#[test]
fn test_decodes_well_formed_payload() {
    let decoder = RecordDecoder::new(Arc::new(CollectingSink::new()));
    let record = record_at(at(0), 7);

    let decoded = decoder.decode_or_skip(&record).unwrap();
    let independent: serde_json::Value = serde_json::from_str(&record.audit_data).unwrap();

    assert_eq!(decoded, independent);
    assert_eq!(decoded["Id"], "7");
    assert_eq!(decoder.skipped(), 0);
}

#[test]
fn test_truncated_payload_is_skipped_once() {
    let sink = Arc::new(CollectingSink::new());
    let decoder = RecordDecoder::new(sink.clone());
    let mut record = record_at(at(0), 1);
    record.audit_data.truncate(record.audit_data.len() / 2);

    assert!(decoder.decode_or_skip(&record).is_none());
    assert_eq!(decoder.skipped(), 1);

    let skipped: Vec<_> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RetrievalEvent::PayloadSkipped {
                record_type,
                skipped_total,
                ..
            } => Some((record_type, skipped_total)),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![("ExchangeItem".to_string(), 1)]);
}

#[tokio::test]
async fn test_stream_drops_malformed_and_continues() {
    let sink = Arc::new(CollectingSink::new());
    let decoder = RecordDecoder::new(sink.clone());

    let mut input = records(0, 6);
    input[1].audit_data = "{\"Id\":\"1\",\"Operation\":\"Mail".into();
    input[4].audit_data = String::new();

    let decoded: Vec<_> = decoder
        .decode_stream(stream::iter(input))
        .collect()
        .await;

    let ids: Vec<_> = decoded.iter().map(|v| v["Id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids, vec!["0", "2", "3", "5"]);
    assert_eq!(decoder.skipped(), 2);
    assert_eq!(
        sink.count(|e| matches!(e, RetrievalEvent::PayloadSkipped { skipped_total: 2, .. })),
        1
    );
}
