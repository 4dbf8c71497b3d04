//! Error types for funnel-sync.
//!
//! Defines the main error enum used throughout the sync pipeline.

use thiserror::Error;

/// Main error type for funnel-sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or invalid configuration (secrets, URLs, config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Login rejected by the query service, or service-account grant rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Timeouts, connection failures and non-success HTTP statuses.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed response bodies.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Destination-level failures (worksheet not found, unexpected payloads).
    #[error("Sheets error: {0}")]
    Sheets(String),

    /// The table shape cannot be addressed as a spreadsheet range.
    #[error("Range error: {0}")]
    Range(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an authentication error with the given message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates a network error with the given message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Creates a sheets error with the given message.
    pub fn sheets(msg: impl Into<String>) -> Self {
        Self::Sheets(msg.into())
    }

    /// Creates a range error with the given message.
    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Maps a reqwest failure to a network error with a readable message.
    pub fn from_request(context: &str, e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::network(format!("{context}: request timed out"))
        } else if e.is_connect() {
            Self::network(format!("{context}: connection failed: {e}"))
        } else {
            Self::network(format!("{context}: {e}"))
        }
    }

    /// Returns true if the retry driver should attempt the operation again.
    ///
    /// Only transient network failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Auth(_) => "Authentication Error",
            Self::Network(_) => "Network Error",
            Self::Parse(_) => "Parse Error",
            Self::Sheets(_) => "Sheets Error",
            Self::Range(_) => "Range Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = SyncError::config("METABASE_PASSWORD is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: METABASE_PASSWORD is not set"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_auth() {
        let err = SyncError::auth("login rejected (401 Unauthorized)");
        assert_eq!(
            err.to_string(),
            "Authentication error: login rejected (401 Unauthorized)"
        );
        assert_eq!(err.category(), "Authentication Error");
    }

    #[test]
    fn test_error_display_range() {
        let err = SyncError::range("table has no columns");
        assert_eq!(err.to_string(), "Range error: table has no columns");
        assert_eq!(err.category(), "Range Error");
    }

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(SyncError::network("503 Service Unavailable").is_retryable());
        assert!(!SyncError::auth("bad password").is_retryable());
        assert!(!SyncError::parse("expected array").is_retryable());
        assert!(!SyncError::sheets("worksheet not found").is_retryable());
        assert!(!SyncError::config("missing").is_retryable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncError>();
    }
}
