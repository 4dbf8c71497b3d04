//! funnel-sync - Refreshes Google Sheets worksheets from Metabase queries.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metabase;
pub mod retry;
pub mod sanitize;
pub mod sheets;
pub mod sync;
pub mod table;
