//! Configuration management for funnel-sync.
//!
//! Settings come from CLI flags / environment variables (secrets, endpoints)
//! and an optional TOML file (worksheet titles, retry tuning). Everything is
//! resolved once at startup into a `Config` that is passed to the runner.

use crate::cli::Cli;
use crate::error::{Result, SyncError};
use crate::metabase::MetabaseCredentials;
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::sheets::ServiceAccountKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Path of the Metabase login endpoint.
const SESSION_PATH: &str = "/api/session";

/// Contents of the optional config file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Destination worksheet titles.
    #[serde(default)]
    pub worksheets: WorksheetConfig,

    /// Retry tuning for fetches and writes.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Destination worksheet titles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorksheetConfig {
    /// Worksheet receiving the base funnel query.
    #[serde(default = "default_base_worksheet")]
    pub base: String,

    /// Worksheet receiving the RFD query.
    #[serde(default = "default_rfd_worksheet")]
    pub rfd: String,
}

fn default_base_worksheet() -> String {
    "Feb Base".to_string()
}

fn default_rfd_worksheet() -> String {
    "RFDs".to_string()
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            base: default_base_worksheet(),
            rfd: default_rfd_worksheet(),
        }
    }
}

/// Retry tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub fetch_attempts: u32,

    #[serde(default = "default_fetch_backoff_secs")]
    pub fetch_backoff_secs: u64,

    #[serde(default = "default_attempts")]
    pub write_attempts: u32,

    #[serde(default = "default_write_backoff_secs")]
    pub write_backoff_secs: u64,
}

fn default_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_fetch_backoff_secs() -> u64 {
    10
}

fn default_write_backoff_secs() -> u64 {
    15
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: default_attempts(),
            fetch_backoff_secs: default_fetch_backoff_secs(),
            write_attempts: default_attempts(),
            write_backoff_secs: default_write_backoff_secs(),
        }
    }
}

impl RetryConfig {
    /// Policy for query fetches.
    pub fn fetch_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.fetch_attempts,
            Duration::from_secs(self.fetch_backoff_secs),
        )
    }

    /// Policy for sheet writes.
    pub fn write_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.write_attempts,
            Duration::from_secs(self.write_backoff_secs),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.fetch_attempts == 0 || self.write_attempts == 0 {
            return Err(SyncError::config(
                "retry attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

impl FileConfig {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("funnel-sync")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SyncError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            SyncError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.retry.validate()?;
        Ok(config)
    }
}

/// One query-to-worksheet mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    /// Display name used in log lines.
    pub name: String,
    /// Query endpoint.
    pub query_url: String,
    /// Destination worksheet title.
    pub worksheet: String,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub metabase: MetabaseCredentials,
    pub service_account: ServiceAccountKey,
    pub sheet_key: String,
    /// Jobs, in the order they run.
    pub jobs: Vec<SyncJob>,
    pub fetch_retry: RetryPolicy,
    pub write_retry: RetryPolicy,
}

impl Config {
    /// Resolves CLI/environment settings and the file config.
    ///
    /// The password and service-account bundle are checked first, before any
    /// other setting is looked at.
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Result<Self> {
        let password = require(cli.metabase_password(), "METABASE_PASSWORD")?;
        let service_account_json =
            require(cli.service_account_json.as_ref(), "SERVICE_ACCOUNT_JSON")?;

        let metabase_url = require(cli.metabase_url.as_ref(), "METABASE_URL")?;
        let username = require(cli.metabase_username(), "METABASE_USERNAME")?;
        let base_query_url = require(cli.base_query_url.as_ref(), "MOM_FUNNEL_BASE_QUERY")?;
        let rfd_query_url = require(cli.rfd_query_url.as_ref(), "MOM_FUNNEL_RFD_QUERY")?;
        let sheet_key = require(cli.sheet_key.as_ref(), "SHEET_ACCESS_KEY")?;

        let service_account = ServiceAccountKey::from_json(service_account_json)?;
        file.retry.validate()?;

        Ok(Self {
            metabase: MetabaseCredentials {
                session_url: session_url(metabase_url)?,
                username: username.to_string(),
                password: password.to_string(),
            },
            service_account,
            sheet_key: sheet_key.to_string(),
            jobs: vec![
                SyncJob {
                    name: "Base Query".to_string(),
                    query_url: validate_url(base_query_url, "MOM_FUNNEL_BASE_QUERY")?,
                    worksheet: file.worksheets.base.clone(),
                },
                SyncJob {
                    name: "RFD Query".to_string(),
                    query_url: validate_url(rfd_query_url, "MOM_FUNNEL_RFD_QUERY")?,
                    worksheet: file.worksheets.rfd.clone(),
                },
            ],
            fetch_retry: file.retry.fetch_policy(),
            write_retry: file.retry.write_policy(),
        })
    }
}

fn require<'a>(value: Option<&'a String>, name: &str) -> Result<&'a str> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SyncError::config(format!("Missing required setting {name}"))),
    }
}

fn validate_url(value: &str, name: &str) -> Result<String> {
    Url::parse(value).map_err(|e| SyncError::config(format!("Invalid URL in {name}: {e}")))?;
    Ok(value.to_string())
}

/// Resolves the login endpoint from either a base URL or the endpoint itself.
pub fn session_url(value: &str) -> Result<String> {
    let mut url = Url::parse(value)
        .map_err(|e| SyncError::config(format!("Invalid URL in METABASE_URL: {e}")))?;

    let path = url.path().trim_end_matches('/').to_string();
    if !path.ends_with(SESSION_PATH) {
        url.set_path(&format!("{path}{SESSION_PATH}"));
    }
    Ok(url.to_string())
}
