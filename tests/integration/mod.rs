//! Integration tests for funnel-sync.
//!
//! Runs the full pipeline against the in-memory query service and spreadsheet.

pub mod common;
pub mod sync_test;
