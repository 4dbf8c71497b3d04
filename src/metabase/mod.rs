//! Metabase query service access for funnel-sync.
//!
//! Provides the `QueryService` trait (login plus single-attempt query calls),
//! its HTTP implementation, and the retrying fetch used by the sync runner.

mod client;
mod mock;

pub use client::{MetabaseClient, MetabaseCredentials};
pub use mock::MemoryQueryService;

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::retry::{retry, RetryPolicy, Sleeper};
use crate::table::Table;

/// Header carrying the session token on query requests.
pub const SESSION_HEADER: &str = "X-Metabase-Session";

/// A Metabase session token, valid for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wraps a token returned by the login endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw token, for the session header.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(<redacted>)")
    }
}

/// Trait defining the interface for the query service.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Opens a session. Called once per run; never retried.
    async fn login(&self) -> Result<Session>;

    /// Runs one query attempt and returns the raw response body.
    async fn run_query(&self, session: &Session, url: &str) -> Result<String>;
}

/// Runs a query with retries and parses the body into a table.
///
/// Only the request is retried. A body that fails to parse is returned as a
/// parse error straight away.
pub async fn fetch_table(
    service: &dyn QueryService,
    session: &Session,
    url: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<Table> {
    let body = retry("Metabase", policy, sleeper, |_| async move {
        service.run_query(session, url).await
    })
    .await?;

    Table::from_json_str(&body)
}
