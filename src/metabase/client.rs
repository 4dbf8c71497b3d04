//! Metabase HTTP client.
//!
//! Implements the `QueryService` trait over Metabase's REST API: a JSON login
//! at `/api/session` and POSTs to saved-question export endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::{QueryService, Session, SESSION_HEADER};
use crate::error::{Result, SyncError};

/// Timeout for the login request.
const LOGIN_TIMEOUT_SECS: u64 = 60;

/// Timeout for each query attempt.
const QUERY_TIMEOUT_SECS: u64 = 180;

/// Login endpoint and credentials.
#[derive(Clone)]
pub struct MetabaseCredentials {
    /// Full URL of the session endpoint.
    pub session_url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for MetabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetabaseCredentials")
            .field("session_url", &self.session_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    id: Option<String>,
}

/// Metabase client.
#[derive(Debug, Clone)]
pub struct MetabaseClient {
    credentials: MetabaseCredentials,
    client: Client,
}

impl MetabaseClient {
    /// Creates a new client with the given credentials.
    pub fn new(credentials: MetabaseCredentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            client,
        })
    }
}

/// Extracts the session id from a login response body.
fn parse_login_response(body: &str) -> Result<Session> {
    let response: LoginResponse = serde_json::from_str(body)
        .map_err(|e| SyncError::auth(format!("Unexpected login response: {e}")))?;
    response
        .id
        .filter(|id| !id.is_empty())
        .map(Session::new)
        .ok_or_else(|| SyncError::auth("Login response has no session id"))
}

#[async_trait]
impl QueryService for MetabaseClient {
    async fn login(&self) -> Result<Session> {
        let request = LoginRequest {
            username: &self.credentials.username,
            password: &self.credentials.password,
        };

        debug!("POST {}", self.credentials.session_url);
        let response = self
            .client
            .post(&self.credentials.session_url)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(LOGIN_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| SyncError::auth(format!("Login request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::auth(format!("Failed to read login response: {e}")))?;

        if !status.is_success() {
            return Err(SyncError::auth(format!("Login rejected ({status})")));
        }

        parse_login_response(&body)
    }

    async fn run_query(&self, session: &Session, url: &str) -> Result<String> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header(SESSION_HEADER, session.token())
            .timeout(Duration::from_secs(QUERY_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| SyncError::from_request("Query request", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::network(format!("Query returned {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SyncError::network(format!("Failed to read query response: {e}")))
    }
}
