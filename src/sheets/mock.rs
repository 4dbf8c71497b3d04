//! In-memory spreadsheet for testing.
//!
//! Records every clear/update call so tests can assert that a destination
//! was (or was not) touched.

use super::{SheetStore, Worksheet};
use crate::error::{Result, SyncError};
use crate::table::{Row, Value};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// A destination call observed by `MemorySheetStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// Worksheet title.
    Clear(String),
    /// Worksheet title and range.
    Update(String, String),
}

#[derive(Debug, Default)]
struct State {
    sheets: Vec<(Worksheet, Vec<Row>)>,
    calls: Vec<StoreCall>,
    failing_updates: usize,
}

/// A spreadsheet held in memory.
///
/// Updates overlay the grid starting at `A1`, like the real API: cells outside
/// the written block keep their old values unless the sheet was cleared.
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    state: Mutex<State>,
}

impl MemorySheetStore {
    /// Creates a store with no worksheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a worksheet with initial contents.
    pub fn with_worksheet(self, title: impl Into<String>, rows: Vec<Row>) -> Self {
        {
            let mut state = self.lock();
            let id = state.sheets.len() as i64;
            state.sheets.push((Worksheet::new(id, title), rows));
        }
        self
    }

    /// Makes the next `count` update calls fail with a network error.
    pub fn failing_updates(self, count: usize) -> Self {
        self.lock().failing_updates = count;
        self
    }

    /// Returns the current grid of a worksheet.
    pub fn contents(&self, title: &str) -> Option<Vec<Row>> {
        self.lock()
            .sheets
            .iter()
            .find(|(ws, _)| ws.title == title)
            .map(|(_, rows)| rows.clone())
    }

    /// Returns the clear/update calls made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl State {
    fn rows_mut(&mut self, worksheet: &Worksheet) -> Result<&mut Vec<Row>> {
        self.sheets
            .iter_mut()
            .find(|(ws, _)| ws.id == worksheet.id)
            .map(|(_, rows)| rows)
            .ok_or_else(|| SyncError::sheets(format!("Unknown worksheet id {}", worksheet.id)))
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn worksheet(&self, title: &str) -> Result<Worksheet> {
        self.lock()
            .sheets
            .iter()
            .find(|(ws, _)| ws.title == title)
            .map(|(ws, _)| ws.clone())
            .ok_or_else(|| SyncError::sheets(format!("Worksheet '{title}' not found")))
    }

    async fn clear(&self, worksheet: &Worksheet) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Clear(worksheet.title.clone()));
        state.rows_mut(worksheet)?.clear();
        Ok(())
    }

    async fn update(&self, worksheet: &Worksheet, range: &str, values: &[Row]) -> Result<()> {
        let mut state = self.lock();
        state
            .calls
            .push(StoreCall::Update(worksheet.title.clone(), range.to_string()));

        if state.failing_updates > 0 {
            state.failing_updates -= 1;
            return Err(SyncError::network("503 Service Unavailable"));
        }

        let grid = state.rows_mut(worksheet)?;
        for (i, row) in values.iter().enumerate() {
            if grid.len() <= i {
                grid.push(Vec::new());
            }
            let target = &mut grid[i];
            for (j, value) in row.iter().enumerate() {
                if target.len() <= j {
                    target.resize(j + 1, Value::Empty);
                }
                target[j] = value.clone();
            }
        }
        Ok(())
    }
}
