//! Spreadsheet cells - the untyped values a ledger range returns, and the
//! parsing rules that turn them into numbers, dates and month tokens.

mod cell_parser;
mod cell_value;

pub use cell_parser::{
    format_iso_date, is_error_marker, parse_amount, parse_date, parse_month_token,
    parse_optional_amount, parse_percent, parse_year_token, ratio_to_percent_policy,
    row_has_error_marker, SERIAL_DATE_EPOCH_OFFSET,
};
pub use cell_value::{cell_at, CellValue, Row};
