//! Column layouts of the ledger sheets.
//!
//! Block index 0 is the header row. Columns not listed as owned hold sheet
//! formulas and are never written.

use super::ledger_traits::RangeSpec;

/// Where a new record lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendMode {
    /// Row after the last row that decodes as a live record.
    AfterLastValid,
    /// First row at or after the data offset whose key column is blank.
    FirstEmptySlot,
    /// Backend append after the table.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLayout {
    pub kind: &'static str,
    pub sheet: &'static str,
    pub width: usize,
    /// Block index of the first data row.
    pub data_offset: usize,
    /// Lowest block index a positional append may use.
    pub min_start_row: usize,
    pub key_columns: &'static [usize],
    /// Cleared by a soft delete.
    pub value_columns: &'static [usize],
    pub owned_columns: &'static [usize],
    pub append_mode: AppendMode,
    pub unique_keys: bool,
    /// A key-changing update clears the old row and appends a new one instead
    /// of rewriting in place.
    pub relocate_on_key_change: bool,
    pub mirror_table: &'static str,
}

impl LedgerLayout {
    /// Whole-column range covering the layout.
    pub fn block_range(&self) -> RangeSpec {
        RangeSpec::columns(self.sheet, 0, self.width - 1)
    }

    /// Range of columns `start..=end` on the sheet row holding block index `index`.
    pub fn row_range(&self, index: usize, start: usize, end: usize) -> RangeSpec {
        RangeSpec::row(self.sheet, start, end, index + 1)
    }

    pub fn primary_key_column(&self) -> usize {
        self.key_columns.first().copied().unwrap_or(0)
    }

    /// Owned columns grouped into contiguous `(start, end)` runs.
    pub fn owned_runs(&self) -> Vec<(usize, usize)> {
        contiguous_runs(self.owned_columns)
    }

    pub fn value_runs(&self) -> Vec<(usize, usize)> {
        contiguous_runs(self.value_columns)
    }
}

fn contiguous_runs(columns: &[usize]) -> Vec<(usize, usize)> {
    let mut sorted = columns.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs: Vec<(usize, usize)> = Vec::new();
    for col in sorted {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == col => *end = col,
            _ => runs.push((col, col)),
        }
    }
    runs
}

/// Monthly account balances. Column 5 is a sheet formula.
pub const BALANCE_LAYOUT: LedgerLayout = LedgerLayout {
    kind: "account balance",
    sheet: "Balances",
    width: 7,
    data_offset: 1,
    min_start_row: 1,
    key_columns: &[0, 1, 2, 3, 4],
    value_columns: &[6],
    owned_columns: &[0, 1, 2, 3, 4, 6],
    append_mode: AppendMode::AfterLastValid,
    unique_keys: true,
    relocate_on_key_change: true,
    mirror_table: "account_balances",
};

/// Dividend receipts. Columns 5 and 6 are sheet formulas.
pub const DIVIDEND_LAYOUT: LedgerLayout = LedgerLayout {
    kind: "dividend",
    sheet: "Dividends",
    width: 8,
    data_offset: 1,
    min_start_row: 1,
    key_columns: &[0, 1, 3, 4],
    value_columns: &[3, 4],
    owned_columns: &[0, 1, 2, 3, 4, 7],
    append_mode: AppendMode::AfterLastValid,
    unique_keys: true,
    relocate_on_key_change: true,
    mirror_table: "dividends",
};

/// Raw deposit and withdrawal log. Column 4 is a running-total formula.
pub const DEPOSIT_LAYOUT: LedgerLayout = LedgerLayout {
    kind: "deposit",
    sheet: "Deposits",
    width: 5,
    data_offset: 1,
    min_start_row: 1,
    key_columns: &[0, 1, 2],
    value_columns: &[2],
    owned_columns: &[0, 1, 2, 3],
    append_mode: AppendMode::Append,
    unique_keys: false,
    relocate_on_key_change: false,
    mirror_table: "deposits",
};

/// Portfolio holdings. Rows 1-2 are summary rows; columns 5-9 are valuation formulas.
pub const HOLDING_LAYOUT: LedgerLayout = LedgerLayout {
    kind: "holding",
    sheet: "Portfolio",
    width: 10,
    data_offset: 3,
    min_start_row: 3,
    key_columns: &[0],
    value_columns: &[0, 1, 2, 3, 4],
    owned_columns: &[0, 1, 2, 3, 4],
    append_mode: AppendMode::FirstEmptySlot,
    unique_keys: true,
    relocate_on_key_change: false,
    mirror_table: "holdings",
};
