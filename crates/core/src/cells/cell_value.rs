use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A row of cells as returned by a ledger range.
pub type Row = Vec<CellValue>;

/// A single spreadsheet cell.
///
/// Values arrive untyped: the values API returns numbers for numeric cells
/// rendered unformatted, strings for everything else, and omits trailing
/// blanks entirely. `null` and missing cells decode as `Empty`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form. Integral numbers render without a fraction.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s.trim()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Cow::Owned(format!("{}", *n as i64))
                } else {
                    Cow::Owned(n.to_string())
                }
            }
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Empty => Cow::Borrowed(""),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Numeric cell from a decimal. Values that do not fit an `f64` become `Empty`.
    pub fn decimal(value: Decimal) -> Self {
        value.to_f64().map(CellValue::Number).unwrap_or_default()
    }

    /// An empty string. Unlike `Empty` (sent as `null` and skipped by the
    /// values API), this clears whatever the cell held.
    pub fn cleared() -> Self {
        CellValue::Text(String::new())
    }

    /// Text cell, or a cleared cell for `None`.
    pub fn optional_text(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => CellValue::Text(s.trim().to_string()),
            _ => CellValue::cleared(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Cell at `index`, treating cells past the end of a short row as empty.
pub fn cell_at(row: &[CellValue], index: usize) -> &CellValue {
    const EMPTY: CellValue = CellValue::Empty;
    row.get(index).unwrap_or(&EMPTY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_untagged_values() {
        let row: Vec<CellValue> =
            serde_json::from_str(r#"["2025", 8, null, "", true, 1.5]"#).unwrap();
        assert_eq!(row[0], CellValue::Text("2025".to_string()));
        assert_eq!(row[1], CellValue::Number(8.0));
        assert_eq!(row[2], CellValue::Empty);
        assert!(row[3].is_blank());
        assert_eq!(row[4], CellValue::Bool(true));
        assert_eq!(row[5], CellValue::Number(1.5));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(CellValue::Number(50000000.0).as_text(), "50000000");
        assert_eq!(CellValue::Number(12.5).as_text(), "12.5");
        assert_eq!(CellValue::text("  8월 ").as_text(), "8월");
        assert_eq!(CellValue::Empty.as_text(), "");
    }

    #[test]
    fn test_cell_at_short_row() {
        let row = vec![CellValue::text("a")];
        assert_eq!(cell_at(&row, 0), &CellValue::text("a"));
        assert_eq!(cell_at(&row, 5), &CellValue::Empty);
    }

    #[test]
    fn test_decimal_cell() {
        assert_eq!(CellValue::decimal(dec!(52000000)), CellValue::Number(52000000.0));
    }

    #[test]
    fn test_serialize_empty_as_null() {
        let row = vec![CellValue::text("x"), CellValue::Empty, CellValue::Number(1.0)];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["x",null,1.0]"#);
    }
}
