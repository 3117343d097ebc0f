use async_trait::async_trait;
use std::fmt;

use crate::cells::Row;
use crate::errors::Result;

/// A rectangular range of a sheet.
///
/// Columns are zero-based and inclusive. Rows are one-based sheet rows; an
/// open row bound selects the whole column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub sheet: String,
    pub start_col: usize,
    pub end_col: usize,
    pub start_row: Option<usize>,
    pub end_row: Option<usize>,
}

impl RangeSpec {
    /// Whole columns `start_col..=end_col`.
    pub fn columns(sheet: impl Into<String>, start_col: usize, end_col: usize) -> Self {
        Self {
            sheet: sheet.into(),
            start_col,
            end_col,
            start_row: None,
            end_row: None,
        }
    }

    /// A single sheet row limited to `start_col..=end_col`.
    pub fn row(sheet: impl Into<String>, start_col: usize, end_col: usize, row: usize) -> Self {
        Self {
            sheet: sheet.into(),
            start_col,
            end_col,
            start_row: Some(row),
            end_row: Some(row),
        }
    }

    /// Sheet rows `start_row..=end_row` limited to `start_col..=end_col`.
    pub fn block(
        sheet: impl Into<String>,
        start_col: usize,
        end_col: usize,
        start_row: usize,
        end_row: usize,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            start_col,
            end_col,
            start_row: Some(start_row),
            end_row: Some(end_row),
        }
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.end_col.saturating_sub(self.start_col) + 1
    }

    /// A1 notation, e.g. `Balances!A2:G2` or `'My Sheet'!A:G`.
    pub fn to_a1(&self) -> String {
        let start = format!(
            "{}{}",
            column_letter(self.start_col),
            self.start_row.map(|r| r.to_string()).unwrap_or_default()
        );
        let end = format!(
            "{}{}",
            column_letter(self.end_col),
            self.end_row.map(|r| r.to_string()).unwrap_or_default()
        );
        format!("{}!{}:{}", quote_sheet_name(&self.sheet), start, end)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Zero-based column index to letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// The spreadsheet holding the ledgers.
///
/// Reads return rows as the API does: trailing blank cells and trailing
/// blank rows may be missing. A read of whole columns starts at sheet row 1,
/// so block index `i` is sheet row `i + 1`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn read_range(&self, range: &RangeSpec) -> Result<Vec<Row>>;

    /// Appends after the last row of the table found in `range`. Returns the
    /// sheet row written when the backend reports it.
    async fn append_rows(&self, range: &RangeSpec, rows: Vec<Row>) -> Result<Option<usize>>;

    /// Overwrites `range` with `rows`. `Empty` cells are left untouched.
    async fn write_range(&self, range: &RangeSpec, rows: Vec<Row>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(6), "G");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_a1_notation() {
        assert_eq!(RangeSpec::row("Balances", 0, 6, 2).to_a1(), "Balances!A2:G2");
        assert_eq!(RangeSpec::columns("Balances", 0, 6).to_a1(), "Balances!A:G");
        assert_eq!(RangeSpec::block("Index", 2, 3, 2, 40).to_a1(), "Index!C2:D40");
        assert_eq!(RangeSpec::columns("My Sheet", 0, 1).to_a1(), "'My Sheet'!A:B");
        assert_eq!(RangeSpec::columns("배당", 0, 7).to_a1(), "'배당'!A:H");
    }

    #[test]
    fn test_width() {
        assert_eq!(RangeSpec::columns("S", 0, 6).width(), 7);
        assert_eq!(RangeSpec::columns("S", 3, 3).width(), 1);
    }
}
