//! Cell sanitizing before values reach the spreadsheet.
//!
//! Two passes run on every written table. `sanitize_table` runs right after a
//! query is parsed and turns nulls and non-finite numbers into empty cells.
//! `sanitize_row` runs on the row lists handed to the writer and turns any
//! remaining non-finite float into `Null`. Both are applied.

use crate::table::{Row, Table, Value};

/// First pass: null, NaN and ±infinity become `Value::Empty`.
///
/// Every other value passes through unchanged. Operates per cell, so mixed
/// column types are fine.
pub fn sanitize_table(table: Table) -> Table {
    let Table { columns, rows } = table;
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(clean_value).collect())
        .collect();
    Table { columns, rows }
}

fn clean_value(value: Value) -> Value {
    match value {
        Value::Null => Value::Empty,
        v if v.is_non_finite() => Value::Empty,
        v => v,
    }
}

/// Second pass: non-finite floats become `Value::Null`.
pub fn sanitize_row(row: &[Value]) -> Row {
    row.iter()
        .map(|v| if v.is_non_finite() { Value::Null } else { v.clone() })
        .collect()
}
