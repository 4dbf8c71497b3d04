//! The sync run: log in, then refresh each worksheet from its query.
//!
//! Jobs run strictly in order. An empty query result is logged and skipped
//! without touching its worksheet; any other failure ends the run, leaving
//! earlier worksheets as they were written.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{Config, SyncJob};
use crate::error::Result;
use crate::metabase::{fetch_table, QueryService};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::sanitize::sanitize_table;
use crate::sheets::{write_table, SheetStore, Worksheet};

/// What happened to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The worksheet was cleared and rewritten.
    Written {
        rows: usize,
        columns: usize,
        range: String,
    },
    /// The query returned no rows; the worksheet was left untouched.
    SkippedEmpty,
}

/// Per-job result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub name: String,
    pub worksheet: String,
    pub outcome: JobOutcome,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub jobs: Vec<JobReport>,
    pub elapsed: Duration,
}

/// Drives one run over a query service and a spreadsheet.
pub struct SyncRunner {
    queries: Arc<dyn QueryService>,
    sheets: Arc<dyn SheetStore>,
    sleeper: Arc<dyn Sleeper>,
    jobs: Vec<SyncJob>,
    fetch_retry: RetryPolicy,
    write_retry: RetryPolicy,
    started: Instant,
}

impl SyncRunner {
    /// Creates a runner with default retry policies and the tokio sleeper.
    pub fn new(
        queries: Arc<dyn QueryService>,
        sheets: Arc<dyn SheetStore>,
        jobs: Vec<SyncJob>,
    ) -> Self {
        Self {
            queries,
            sheets,
            sleeper: Arc::new(TokioSleeper),
            jobs,
            fetch_retry: RetryPolicy::fetch(),
            write_retry: RetryPolicy::write(),
            started: Instant::now(),
        }
    }

    /// Creates a runner for the jobs and retry policies in `config`.
    pub fn from_config(
        config: &Config,
        queries: Arc<dyn QueryService>,
        sheets: Arc<dyn SheetStore>,
    ) -> Self {
        Self::new(queries, sheets, config.jobs.clone())
            .with_retry(config.fetch_retry, config.write_retry)
    }

    /// Overrides the fetch and write retry policies.
    pub fn with_retry(mut self, fetch: RetryPolicy, write: RetryPolicy) -> Self {
        self.fetch_retry = fetch;
        self.write_retry = write;
        self
    }

    /// Replaces the sleeper used between retry attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Measures elapsed time from `started` instead of construction.
    pub fn started_at(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Runs every job in order.
    pub async fn run(&self) -> Result<RunReport> {
        info!("Creating Metabase session...");
        let session = self.queries.login().await?;
        info!("Metabase session created");

        info!("Connecting to Google Sheets...");
        let mut worksheets: Vec<Worksheet> = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            worksheets.push(self.sheets.worksheet(&job.worksheet).await?);
        }

        let mut reports = Vec::with_capacity(self.jobs.len());
        for (job, worksheet) in self.jobs.iter().zip(&worksheets) {
            info!("Fetching {} from Metabase...", job.name);
            let table = fetch_table(
                self.queries.as_ref(),
                &session,
                &job.query_url,
                &self.fetch_retry,
                self.sleeper.as_ref(),
            )
            .await?;

            let outcome = if table.is_empty() {
                warn!("{} returned empty dataset, leaving '{}' unchanged", job.name, worksheet.title);
                JobOutcome::SkippedEmpty
            } else {
                info!("{} rows fetched: {}", job.name, table.row_count());
                let table = sanitize_table(table);
                info!("Updating '{}' tab...", worksheet.title);
                let range = write_table(
                    self.sheets.as_ref(),
                    worksheet,
                    &table,
                    &self.write_retry,
                    self.sleeper.as_ref(),
                )
                .await?;
                JobOutcome::Written {
                    rows: table.row_count(),
                    columns: table.column_count(),
                    range,
                }
            };

            reports.push(JobReport {
                name: job.name.clone(),
                worksheet: worksheet.title.clone(),
                outcome,
            });
        }

        let elapsed = self.started.elapsed();
        info!("Total execution time: {}", format_elapsed(elapsed));
        info!("Funnel sync completed successfully");

        Ok(RunReport {
            jobs: reports,
            elapsed,
        })
    }
}

/// Formats a duration as whole minutes and seconds (`"2m 5s"`).
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}
