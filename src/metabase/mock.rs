//! Scripted query service for testing.
//!
//! Each URL gets a queue of responses that are handed out one per call.

use super::{QueryService, Session};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

const MOCK_TOKEN: &str = "mock-session-token";

#[derive(Debug, Default)]
struct State {
    responses: HashMap<String, VecDeque<Result<String>>>,
    queries: Vec<String>,
    logins: usize,
    login_error: Option<String>,
}

/// A query service that replays canned responses.
#[derive(Debug, Default)]
pub struct MemoryQueryService {
    state: Mutex<State>,
}

impl MemoryQueryService {
    /// Creates a service with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response body for `url`.
    pub fn with_response(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.push(url.into(), Ok(body.into()));
        self
    }

    /// Queues a failed attempt for `url`.
    pub fn with_failure(self, url: impl Into<String>, error: SyncError) -> Self {
        self.push(url.into(), Err(error));
        self
    }

    /// Makes `login` fail with an authentication error.
    pub fn rejecting_login(self, message: impl Into<String>) -> Self {
        self.lock().login_error = Some(message.into());
        self
    }

    /// Number of query attempts made against `url`.
    pub fn query_count(&self, url: &str) -> usize {
        self.lock().queries.iter().filter(|q| *q == url).count()
    }

    /// Every query URL requested, in order.
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    /// Number of login calls made.
    pub fn login_count(&self) -> usize {
        self.lock().logins
    }

    fn push(&self, url: String, response: Result<String>) {
        self.lock()
            .responses
            .entry(url)
            .or_default()
            .push_back(response);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl QueryService for MemoryQueryService {
    async fn login(&self) -> Result<Session> {
        let mut state = self.lock();
        state.logins += 1;
        match &state.login_error {
            Some(message) => Err(SyncError::auth(message.clone())),
            None => Ok(Session::new(MOCK_TOKEN)),
        }
    }

    async fn run_query(&self, session: &Session, url: &str) -> Result<String> {
        let mut state = self.lock();
        state.queries.push(url.to_string());

        if session.token() != MOCK_TOKEN {
            return Err(SyncError::network("401 Unauthorized"));
        }

        state
            .responses
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(SyncError::internal(format!("No scripted response for {url}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_replay_in_order() {
        let service = MemoryQueryService::new()
            .with_failure("q", SyncError::network("timeout"))
            .with_response("q", "[]");
        let session = service.login().await.unwrap();

        assert!(service.run_query(&session, "q").await.is_err());
        assert_eq!(service.run_query(&session, "q").await.unwrap(), "[]");
        assert!(matches!(
            service.run_query(&session, "q").await,
            Err(SyncError::Internal(_))
        ));
        assert_eq!(service.query_count("q"), 3);
    }

    #[tokio::test]
    async fn test_rejecting_login() {
        let service = MemoryQueryService::new().rejecting_login("401 Unauthorized");
        assert!(matches!(service.login().await, Err(SyncError::Auth(_))));
        assert_eq!(service.login_count(), 1);
    }
}
