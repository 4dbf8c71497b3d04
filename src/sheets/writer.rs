//! Full-replace worksheet writes.

use tracing::info;

use super::range::grid_range;
use super::{SheetStore, Worksheet};
use crate::error::Result;
use crate::retry::{retry, RetryPolicy, Sleeper};
use crate::sanitize::sanitize_row;
use crate::table::{Row, Table, Value};

/// Builds the value grid: header row, then data rows through `sanitize_row`.
pub fn build_grid(table: &Table) -> Vec<Row> {
    let header: Row = table
        .columns
        .iter()
        .map(|c| Value::String(c.clone()))
        .collect();

    std::iter::once(header)
        .chain(table.rows.iter().map(|row| sanitize_row(row)))
        .collect()
}

/// Clears `worksheet` and rewrites it from `table`, retrying per `policy`.
///
/// Each attempt clears before writing, so a failed update leaves the
/// worksheet empty until a later attempt succeeds. Returns the written range.
pub async fn write_table(
    store: &dyn SheetStore,
    worksheet: &Worksheet,
    table: &Table,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<String> {
    // Rejected before the first clear.
    let range = grid_range(table.row_count(), table.column_count())?;
    let range_ref = range.as_str();

    retry("Sheets", policy, sleeper, |attempt| async move {
        info!("Updating worksheet: {} (attempt {})", worksheet.title, attempt);
        store.clear(worksheet).await?;
        let values = build_grid(table);
        store.update(worksheet, range_ref, &values).await
    })
    .await?;

    info!("Sheet updated successfully: {} ({})", worksheet.title, range);
    Ok(range)
}
