//! End-to-end sync runs against in-memory collaborators.

use super::common::{runner, stale_rows, InstantSleeper, BASE_URL, RFD_URL};
use funnel_sync::error::SyncError;
use funnel_sync::metabase::MemoryQueryService;
use funnel_sync::sheets::{MemorySheetStore, StoreCall};
use funnel_sync::sync::JobOutcome;
use funnel_sync::table::Value;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const THREE_BY_TWO: &str = r#"[
    {"stage": "Visited", "users": 1200},
    {"stage": "Signed up", "users": 310},
    {"stage": "Paid", "users": null}
]"#;

fn sheets_with_stale_data() -> Arc<MemorySheetStore> {
    Arc::new(
        MemorySheetStore::new()
            .with_worksheet("Feb Base", stale_rows(8, 5))
            .with_worksheet("RFDs", stale_rows(3, 3)),
    )
}

#[tokio::test]
async fn test_overwrite_replaces_all_stale_rows() {
    let queries = Arc::new(
        MemoryQueryService::new()
            .with_response(BASE_URL, THREE_BY_TWO)
            .with_response(RFD_URL, r#"[{"rfd_id": "RFD-9", "amount": 12.5}]"#),
    );
    let sheets = sheets_with_stale_data();
    let sleeper = Arc::new(InstantSleeper::default());

    let report = runner(&queries, &sheets, &sleeper).run().await.unwrap();

    assert_eq!(
        report.jobs[0].outcome,
        JobOutcome::Written {
            rows: 3,
            columns: 2,
            range: "A1:B4".to_string()
        }
    );
    assert_eq!(
        sheets.contents("Feb Base").unwrap(),
        vec![
            vec![Value::from("stage"), Value::from("users")],
            vec![Value::from("Visited"), Value::Int(1200)],
            vec![Value::from("Signed up"), Value::Int(310)],
            vec![Value::from("Paid"), Value::Empty],
        ]
    );
    assert_eq!(
        sheets.contents("RFDs").unwrap(),
        vec![
            vec![Value::from("rfd_id"), Value::from("amount")],
            vec![Value::from("RFD-9"), Value::Float(12.5)],
        ]
    );
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_first_empty_second_written() {
    let queries = Arc::new(
        MemoryQueryService::new()
            .with_response(BASE_URL, "[]")
            .with_response(RFD_URL, THREE_BY_TWO),
    );
    let sheets = sheets_with_stale_data();
    let before = sheets.contents("Feb Base").unwrap();
    let sleeper = Arc::new(InstantSleeper::default());

    let report = runner(&queries, &sheets, &sleeper).run().await.unwrap();

    assert_eq!(report.jobs[0].outcome, JobOutcome::SkippedEmpty);
    assert_eq!(sheets.contents("Feb Base").unwrap(), before);
    assert_eq!(sheets.contents("RFDs").unwrap().len(), 4);
    assert_eq!(
        sheets.calls(),
        vec![
            StoreCall::Clear("RFDs".to_string()),
            StoreCall::Update("RFDs".to_string(), "A1:B4".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_transient_failures_are_retried_with_backoff() {
    let queries = Arc::new(
        MemoryQueryService::new()
            .with_failure(BASE_URL, SyncError::network("request timed out"))
            .with_response(BASE_URL, THREE_BY_TWO)
            .with_response(RFD_URL, THREE_BY_TWO),
    );
    let sheets = Arc::new(
        MemorySheetStore::new()
            .with_worksheet("Feb Base", vec![])
            .with_worksheet("RFDs", vec![])
            .failing_updates(2),
    );
    let sleeper = Arc::new(InstantSleeper::default());

    runner(&queries, &sheets, &sleeper).run().await.unwrap();

    assert_eq!(
        sleeper.recorded(),
        vec![
            Duration::from_secs(10),
            Duration::from_secs(15),
            Duration::from_secs(30),
        ]
    );
    assert_eq!(queries.query_count(BASE_URL), 2);
    assert_eq!(sheets.contents("Feb Base").unwrap().len(), 4);
}

#[tokio::test]
async fn test_exhausted_write_aborts_run() {
    let queries = Arc::new(
        MemoryQueryService::new()
            .with_response(BASE_URL, THREE_BY_TWO)
            .with_response(RFD_URL, THREE_BY_TWO),
    );
    let sheets = Arc::new(
        MemorySheetStore::new()
            .with_worksheet("Feb Base", stale_rows(2, 2))
            .with_worksheet("RFDs", stale_rows(2, 2))
            .failing_updates(5),
    );
    let sleeper = Arc::new(InstantSleeper::default());

    let err = runner(&queries, &sheets, &sleeper).run().await.unwrap_err();

    assert!(matches!(err, SyncError::Network(_)));
    assert_eq!(sleeper.recorded().len(), 4);
    // Cleared by the last attempt, never rewritten.
    assert!(sheets.contents("Feb Base").unwrap().is_empty());
    assert_eq!(sheets.contents("RFDs").unwrap(), stale_rows(2, 2));
    assert_eq!(queries.query_count(RFD_URL), 0);
}

#[tokio::test]
async fn test_twenty_six_columns_end_at_z() {
    let record: serde_json::Map<String, serde_json::Value> = (1..=26)
        .map(|i| (format!("col_{i:02}"), serde_json::Value::from(i)))
        .collect();
    let body = serde_json::Value::Array(vec![serde_json::Value::Object(record)]).to_string();

    let queries = Arc::new(
        MemoryQueryService::new()
            .with_response(BASE_URL, body)
            .with_response(RFD_URL, "[]"),
    );
    let sheets = sheets_with_stale_data();
    let sleeper = Arc::new(InstantSleeper::default());

    let report = runner(&queries, &sheets, &sleeper).run().await.unwrap();

    assert_eq!(
        report.jobs[0].outcome,
        JobOutcome::Written {
            rows: 1,
            columns: 26,
            range: "A1:Z2".to_string()
        }
    );
    assert_eq!(report.jobs[1].outcome, JobOutcome::SkippedEmpty);
}

#[tokio::test]
async fn test_malformed_response_is_fatal_without_retry() {
    let queries = Arc::new(
        MemoryQueryService::new().with_response(BASE_URL, r#"{"error": "card not found"}"#),
    );
    let sheets = sheets_with_stale_data();
    let sleeper = Arc::new(InstantSleeper::default());

    let err = runner(&queries, &sheets, &sleeper).run().await.unwrap_err();

    assert!(matches!(err, SyncError::Parse(_)));
    assert_eq!(queries.query_count(BASE_URL), 1);
    assert!(sleeper.recorded().is_empty());
    assert!(sheets.calls().is_empty());
}
