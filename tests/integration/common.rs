//! Shared helpers for sync integration tests.

use async_trait::async_trait;
use funnel_sync::config::SyncJob;
use funnel_sync::metabase::MemoryQueryService;
use funnel_sync::retry::Sleeper;
use funnel_sync::sheets::MemorySheetStore;
use funnel_sync::sync::SyncRunner;
use funnel_sync::table::{Row, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://mb.example.com/api/card/101/query/json";
pub const RFD_URL: &str = "https://mb.example.com/api/card/102/query/json";

/// Sleeper that returns immediately and remembers what it was asked for.
#[derive(Debug, Default)]
pub struct InstantSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub fn jobs() -> Vec<SyncJob> {
    vec![
        SyncJob {
            name: "Base Query".to_string(),
            query_url: BASE_URL.to_string(),
            worksheet: "Feb Base".to_string(),
        },
        SyncJob {
            name: "RFD Query".to_string(),
            query_url: RFD_URL.to_string(),
            worksheet: "RFDs".to_string(),
        },
    ]
}

pub fn stale_rows(rows: usize, columns: usize) -> Vec<Row> {
    (0..rows)
        .map(|r| {
            (0..columns)
                .map(|c| Value::String(format!("stale-{r}-{c}")))
                .collect()
        })
        .collect()
}

pub fn runner(
    queries: &Arc<MemoryQueryService>,
    sheets: &Arc<MemorySheetStore>,
    sleeper: &Arc<InstantSleeper>,
) -> SyncRunner {
    SyncRunner::new(queries.clone(), sheets.clone(), jobs()).with_sleeper(sleeper.clone())
}
