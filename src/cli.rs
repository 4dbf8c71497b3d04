//! Command-line argument parsing for funnel-sync.
//!
//! Every setting can come from a flag or from the environment (including a
//! `.env` file loaded at startup). Flags take precedence.

use clap::Parser;
use std::path::PathBuf;

/// Refreshes funnel worksheets in Google Sheets from Metabase queries.
#[derive(Parser, Debug, Default)]
#[command(name = "funnel-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Metabase base URL or session endpoint (e.g., https://metabase.example.com)
    #[arg(long, env = "METABASE_URL", value_name = "URL")]
    pub metabase_url: Option<String>,

    /// Metabase username
    #[arg(long, env = "METABASE_USERNAME", value_name = "USER")]
    pub username: Option<String>,

    /// Metabase password
    #[arg(long, env = "METABASE_PASSWORD", value_name = "SECRET", hide_env_values = true)]
    pub password: Option<String>,

    /// Google service-account credential bundle (JSON text)
    #[arg(
        long,
        env = "SERVICE_ACCOUNT_JSON",
        value_name = "JSON",
        hide_env_values = true
    )]
    pub service_account_json: Option<String>,

    /// Query endpoint for the base funnel
    #[arg(long, env = "MOM_FUNNEL_BASE_QUERY", value_name = "URL")]
    pub base_query_url: Option<String>,

    /// Query endpoint for the RFD funnel
    #[arg(long, env = "MOM_FUNNEL_RFD_QUERY", value_name = "URL")]
    pub rfd_query_url: Option<String>,

    /// Spreadsheet key (the id in the sheet URL)
    #[arg(long, env = "SHEET_ACCESS_KEY", value_name = "KEY")]
    pub sheet_key: Option<String>,

    /// Fallback for the username, read from the deployment's older variable
    #[arg(long = "legacy-username", env = "USERNAME", hide = true)]
    pub legacy_username: Option<String>,

    /// Fallback for the password, read from the deployment's older variable
    #[arg(
        long = "legacy-password",
        env = "SWAPNIL_SECRET_KEY",
        hide = true,
        hide_env_values = true
    )]
    pub legacy_password: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Metabase username, falling back to `USERNAME`.
    pub fn metabase_username(&self) -> Option<&String> {
        self.username.as_ref().or(self.legacy_username.as_ref())
    }

    /// Metabase password, falling back to `SWAPNIL_SECRET_KEY`.
    pub fn metabase_password(&self) -> Option<&String> {
        self.password.as_ref().or(self.legacy_password.as_ref())
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::FileConfig::default_path)
    }
}
