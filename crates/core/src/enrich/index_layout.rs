use crate::cells::{CellValue, Row};
use crate::ledger::RangeSpec;
use crate::period::YearMonth;

/// Columns of an index block: a period label, the raw index and the two
/// derived outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBlockLayout {
    pub sheet: &'static str,
    pub label_column: usize,
    pub raw_index_column: usize,
    pub dollar_index_column: usize,
    pub adjusted_index_column: usize,
    /// Block index of the first data row.
    pub data_offset: usize,
}

pub const INDEX_LAYOUT: IndexBlockLayout = IndexBlockLayout {
    sheet: "Index",
    label_column: 0,
    raw_index_column: 1,
    dollar_index_column: 2,
    adjusted_index_column: 3,
    data_offset: 1,
};

impl IndexBlockLayout {
    pub fn last_column(&self) -> usize {
        self.label_column
            .max(self.raw_index_column)
            .max(self.dollar_index_column)
            .max(self.adjusted_index_column)
    }

    pub fn block_range(&self) -> RangeSpec {
        RangeSpec::columns(self.sheet, 0, self.last_column())
    }

    /// The contiguous column span holding both outputs.
    pub fn output_span(&self) -> (usize, usize) {
        let start = self.dollar_index_column.min(self.adjusted_index_column);
        let end = self.dollar_index_column.max(self.adjusted_index_column);
        (start, end)
    }

    /// Period of a row's label cell.
    ///
    /// Numeric labels are read with two decimals, so a `25.10` cell that
    /// arrives as the number 25.1 still means October.
    pub fn period_of(&self, row: &Row) -> Option<YearMonth> {
        match row.get(self.label_column)? {
            CellValue::Number(n) => YearMonth::parse(&format!("{:.2}", n)),
            CellValue::Text(s) => YearMonth::parse(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_of_numeric_label_keeps_two_decimals() {
        let row = vec![CellValue::Number(25.1)];
        assert_eq!(INDEX_LAYOUT.period_of(&row), YearMonth::new(2025, 10));
        let row = vec![CellValue::Number(25.01)];
        assert_eq!(INDEX_LAYOUT.period_of(&row), YearMonth::new(2025, 1));
    }

    #[test]
    fn test_period_of_text_label() {
        let row = vec![CellValue::text("24.12")];
        assert_eq!(INDEX_LAYOUT.period_of(&row), YearMonth::new(2024, 12));
        let row = vec![CellValue::text("Period")];
        assert_eq!(INDEX_LAYOUT.period_of(&row), None);
        assert_eq!(INDEX_LAYOUT.period_of(&Vec::new()), None);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(INDEX_LAYOUT.block_range().to_a1(), "Index!A:D");
        assert_eq!(INDEX_LAYOUT.output_span(), (2, 3));
    }
}
