//! funnel-sync - Refreshes Google Sheets worksheets from Metabase queries.

use funnel_sync::cli::Cli;
use funnel_sync::config::{Config, FileConfig};
use funnel_sync::error::{Result, SyncError};
use funnel_sync::logging;
use funnel_sync::metabase::MetabaseClient;
use funnel_sync::sheets::GoogleSheetsClient;
use funnel_sync::sync::SyncRunner;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

fn main() {
    let started = Instant::now();

    // A missing .env file is fine; real deployments inject the environment.
    let dotenv = dotenvy::dotenv();
    logging::init_stderr_logging();
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run(started) {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run(started: Instant) -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let file_config = FileConfig::load_from_file(&config_path)?;
    let config = Config::resolve(&cli, &file_config)?;

    let queries = MetabaseClient::new(config.metabase.clone())?;
    let sheets = GoogleSheetsClient::new(config.service_account.clone(), &config.sheet_key)?;
    let runner = SyncRunner::from_config(&config, Arc::new(queries), Arc::new(sheets))
        .started_at(started);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SyncError::internal(format!("Failed to start runtime: {e}")))?;

    let report = runtime.block_on(runner.run())?;
    for job in &report.jobs {
        info!("{} -> '{}': {:?}", job.name, job.worksheet, job.outcome);
    }
    Ok(())
}
