use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::ledger_traits::{LedgerStore, RangeSpec};
use crate::cells::{CellValue, Row};
use crate::errors::{Error, LedgerError, Result};

/// Ledger store holding sheets in memory. Used by tests and offline runs.
///
/// Mirrors the values API: writes skip `Empty` cells, reads trim trailing
/// blank cells and trailing blank rows.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    sheets: Mutex<HashMap<String, Vec<Row>>>,
    failing: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `rows` for `sheet`, starting at sheet row 1.
    pub fn with_sheet(sheet: &str, rows: Vec<Row>) -> Self {
        let store = Self::new();
        store.set_sheet(sheet, rows);
        store
    }

    pub fn set_sheet(&self, sheet: &str, rows: Vec<Row>) {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(sheet.to_string(), rows);
        }
    }

    /// Raw contents of `sheet` as stored, untrimmed.
    pub fn sheet(&self, sheet: &str) -> Vec<Row> {
        self.sheets
            .lock()
            .map(|sheets| sheets.get(sheet).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Makes every call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Ledger(LedgerError::Transport(
                "ledger store unavailable".to_string(),
            )));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Row>>>> {
        self.sheets
            .lock()
            .map_err(|e| Error::Ledger(LedgerError::Transport(e.to_string())))
    }
}

fn trim_row(mut row: Row) -> Row {
    while row.last().is_some_and(CellValue::is_blank) {
        row.pop();
    }
    row
}

fn write_cells(sheet: &mut Vec<Row>, first_row: usize, start_col: usize, rows: Vec<Row>) {
    for (offset, cells) in rows.into_iter().enumerate() {
        let index = first_row + offset;
        if sheet.len() <= index {
            sheet.resize(index + 1, Vec::new());
        }
        let target = &mut sheet[index];
        for (col_offset, cell) in cells.into_iter().enumerate() {
            if cell == CellValue::Empty {
                continue;
            }
            let col = start_col + col_offset;
            if target.len() <= col {
                target.resize(col + 1, CellValue::Empty);
            }
            target[col] = cell;
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn read_range(&self, range: &RangeSpec) -> Result<Vec<Row>> {
        self.check_available()?;
        let sheets = self.lock()?;
        let Some(sheet) = sheets.get(&range.sheet) else {
            return Ok(Vec::new());
        };

        let first = range.start_row.unwrap_or(1).max(1) - 1;
        let last = range.end_row.map(|r| r.min(sheet.len())).unwrap_or(sheet.len());

        let mut rows: Vec<Row> = (first..last)
            .map(|index| {
                let row = &sheet[index];
                let cells = (range.start_col..=range.end_col)
                    .map(|col| row.get(col).cloned().unwrap_or_default())
                    .collect();
                trim_row(cells)
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn append_rows(&self, range: &RangeSpec, rows: Vec<Row>) -> Result<Option<usize>> {
        self.check_available()?;
        let mut sheets = self.lock()?;
        let sheet = sheets.entry(range.sheet.clone()).or_default();

        let used = sheet
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_blank()))
            .map(|i| i + 1)
            .unwrap_or(0);
        write_cells(sheet, used, range.start_col, rows);
        Ok(Some(used + 1))
    }

    async fn write_range(&self, range: &RangeSpec, rows: Vec<Row>) -> Result<()> {
        self.check_available()?;
        let first_row = range.start_row.ok_or_else(|| {
            Error::Ledger(LedgerError::InvalidRange(format!(
                "{} has no start row",
                range.to_a1()
            )))
        })?;
        if first_row == 0 {
            return Err(Error::Ledger(LedgerError::InvalidRange(range.to_a1())));
        }
        if rows.iter().any(|r| r.len() > range.width()) {
            return Err(Error::Ledger(LedgerError::InvalidRange(format!(
                "{} is narrower than the values written",
                range.to_a1()
            ))));
        }

        let mut sheets = self.lock()?;
        let sheet = sheets.entry(range.sheet.clone()).or_default();
        write_cells(sheet, first_row - 1, range.start_col, rows);
        Ok(())
    }
}
