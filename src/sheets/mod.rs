//! Destination spreadsheet access for funnel-sync.
//!
//! Provides a trait-based interface over the spreadsheet so the sync runner
//! can be driven against Google Sheets or an in-memory store.

pub mod auth;
mod google;
mod mock;
pub mod range;
pub mod writer;

pub use auth::{AccessToken, ServiceAccountKey};
pub use google::GoogleSheetsClient;
pub use mock::{MemorySheetStore, StoreCall};
pub use writer::{build_grid, write_table};

use crate::error::Result;
use crate::table::Row;
use async_trait::async_trait;

/// A worksheet (tab) inside the destination spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    /// Stable numeric sheet id.
    pub id: i64,
    /// Tab title, used for lookup and range addressing.
    pub title: String,
}

impl Worksheet {
    /// Creates a worksheet handle.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Trait defining the operations the writer needs from a spreadsheet.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Looks up a pre-existing worksheet by title.
    async fn worksheet(&self, title: &str) -> Result<Worksheet>;

    /// Removes every value from the worksheet.
    async fn clear(&self, worksheet: &Worksheet) -> Result<()>;

    /// Writes a grid of rows into `range` (A1 notation, without sheet prefix).
    async fn update(&self, worksheet: &Worksheet, range: &str, values: &[Row]) -> Result<()>;
}
