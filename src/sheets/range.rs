//! A1-notation helpers.
//!
//! Columns use bijective base-26 letters (`A..Z`, `AA..ZZ`, `AAA..`). Widths
//! past the Sheets column ceiling are rejected rather than wrapped.

use crate::error::{Result, SyncError};

/// Widest grid Google Sheets accepts (column `ZZZ`).
pub const MAX_COLUMNS: usize = 18_278;

/// Returns the letters for a 1-based column number (1 → `A`, 27 → `AA`).
pub fn column_letter(column: usize) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Range covering a header row plus `data_rows` rows across `columns` columns.
pub fn grid_range(data_rows: usize, columns: usize) -> Result<String> {
    if columns == 0 {
        return Err(SyncError::range("table has no columns"));
    }
    if columns > MAX_COLUMNS {
        return Err(SyncError::range(format!(
            "table has {columns} columns, the sheet limit is {MAX_COLUMNS}"
        )));
    }
    Ok(format!("A1:{}{}", column_letter(columns), data_rows + 1))
}

/// Prefixes a range with a quoted sheet title: `'Feb Base'!A1:B4`.
///
/// A bare title addresses the whole sheet.
pub fn qualified(title: &str, range: Option<&str>) -> String {
    let quoted = format!("'{}'", title.replace('\'', "''"));
    match range {
        Some(range) => format!("{quoted}!{range}"),
        None => quoted,
    }
}
