//! Tolerant cell parsing.
//!
//! Every function here accepts whatever the spreadsheet returned and never
//! fails: unusable input maps to zero, `None` or `0` so the caller can skip
//! the row.

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::cell_value::CellValue;

/// Day number of 1970-01-01 in the spreadsheet serial date system.
pub const SERIAL_DATE_EPOCH_OFFSET: i64 = 25569;

const SECONDS_PER_DAY: f64 = 86_400.0;

const STRIPPED_SYMBOLS: &[char] = &[',', '%', '₩', '$', '€', '£', '¥', '￦'];

lazy_static! {
    static ref ERROR_MARKER_REGEX: Regex =
        Regex::new(r"#(REF!|N/A|VALUE!|DIV/0!|NAME\?|NUM!|ERROR!|NULL!)")
            .expect("Invalid regex pattern");

    static ref YMD_DATE_REGEX: Regex =
        Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").expect("Invalid regex pattern");

    static ref MDY_DATE_REGEX: Regex =
        Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4})$").expect("Invalid regex pattern");

    static ref SERIAL_TEXT_REGEX: Regex =
        Regex::new(r"^\d{5}(\.\d+)?$").expect("Invalid regex pattern");

    static ref MONTH_LABEL_REGEX: Regex =
        Regex::new(r"^(\d{1,2})\s*(월|月)?$").expect("Invalid regex pattern");
}

/// True when the cell holds a spreadsheet formula error such as `#REF!`.
pub fn is_error_marker(cell: &CellValue) -> bool {
    match cell {
        CellValue::Text(s) => ERROR_MARKER_REGEX.is_match(s),
        _ => false,
    }
}

/// True when any of the given columns of `row` holds a formula error.
pub fn row_has_error_marker(row: &[CellValue], columns: &[usize]) -> bool {
    columns
        .iter()
        .filter_map(|&c| row.get(c))
        .any(is_error_marker)
}

/// Parses a monetary cell, returning zero for anything unusable.
pub fn parse_amount(cell: &CellValue) -> Decimal {
    parse_optional_amount(cell).unwrap_or(Decimal::ZERO)
}

/// Parses a monetary cell, distinguishing blank or garbled cells (`None`)
/// from an explicit zero.
pub fn parse_optional_amount(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(n) => decimal_from_f64(*n),
        CellValue::Text(s) => parse_amount_text(s),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    // Display gives the shortest round-trip form, so 0.1 stays 0.1.
    Decimal::from_str(&value.to_string()).ok()
}

fn parse_amount_text(raw: &str) -> Option<Decimal> {
    if ERROR_MARKER_REGEX.is_match(raw) {
        return None;
    }

    let mut cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !STRIPPED_SYMBOLS.contains(c))
        .collect();
    cleaned = cleaned.replace('원', "");

    let mut negative = false;
    if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        negative = true;
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }

    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    if negative {
        Some(-value.abs())
    } else {
        Some(value)
    }
}

/// Interprets a value with magnitude strictly between 0 and 10 as a ratio
/// and scales it to a percentage. Everything else is already a percentage.
///
/// A genuine 5% written as `5` is therefore read as 500%.
pub fn ratio_to_percent_policy(value: Decimal) -> Decimal {
    let magnitude = value.abs();
    if magnitude > Decimal::ZERO && magnitude < Decimal::TEN {
        value * Decimal::ONE_HUNDRED
    } else {
        value
    }
}

/// Parses a percentage cell (`"15.5%"`, `1.566`), applying
/// [`ratio_to_percent_policy`].
pub fn parse_percent(cell: &CellValue) -> Decimal {
    ratio_to_percent_policy(parse_amount(cell))
}

/// Parses a date cell.
///
/// Numbers are serial dates; text may be `YYYY-MM-DD` (with `-`, `/` or `.`),
/// `MM-DD-YYYY` / `MM/DD/YYYY`, or a serial written as text. A time part
/// after whitespace or `T` is ignored.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Number(n) => date_from_serial(*n),
        CellValue::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let seconds = ((serial - SERIAL_DATE_EPOCH_OFFSET as f64) * SECONDS_PER_DAY).floor();
    DateTime::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let token = trimmed
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or(trimmed);

    if let Some(caps) = YMD_DATE_REGEX.captures(token) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = MDY_DATE_REGEX.captures(token) {
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if SERIAL_TEXT_REGEX.is_match(token) {
        return date_from_serial(token.parse().ok()?);
    }

    None
}

/// `YYYY-MM-DD`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Resolves a month number (1..=12) from a numeric month column, falling back
/// to a `"8월"` / `"8月"` / `"8"` label column. Returns 0 when neither works.
pub fn parse_month_token(numeric: &CellValue, label: &CellValue) -> u32 {
    if let Some(month) = month_from_numeric(numeric) {
        return month;
    }
    month_from_label(label).unwrap_or(0)
}

fn month_from_numeric(cell: &CellValue) -> Option<u32> {
    let value = match cell {
        CellValue::Number(n) if n.fract() == 0.0 => *n as i64,
        CellValue::Text(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (1..=12).contains(&value).then_some(value as u32)
}

fn month_from_label(cell: &CellValue) -> Option<u32> {
    match cell {
        CellValue::Number(_) => month_from_numeric(cell),
        CellValue::Text(s) => {
            let caps = MONTH_LABEL_REGEX.captures(s.trim())?;
            let month = caps[1].parse::<u32>().ok()?;
            (1..=12).contains(&month).then_some(month)
        }
        _ => None,
    }
}

/// Resolves a four-digit year from `"2025"`, `2025` or a two-digit `"25"`.
/// Returns 0 when unusable.
pub fn parse_year_token(cell: &CellValue) -> i32 {
    let (value, two_digit) = match cell {
        CellValue::Number(n) if n.fract() == 0.0 => (*n as i64, *n > 0.0 && *n < 100.0),
        CellValue::Text(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(v) => (v, s.len() == 2),
                Err(_) => return 0,
            }
        }
        _ => return 0,
    };

    if two_digit {
        return 2000 + value as i32;
    }
    if (1900..=2999).contains(&value) {
        value as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn test_parse_amount_strips_symbols() {
        assert_eq!(parse_amount(&text("₩1,234,567")), dec!(1234567));
        assert_eq!(parse_amount(&text("$ 12.50")), dec!(12.50));
        assert_eq!(parse_amount(&text("50,000원")), dec!(50000));
        assert_eq!(parse_amount(&text("€3")), dec!(3));
        assert_eq!(parse_amount(&CellValue::Number(50000000.0)), dec!(50000000));
    }

    #[test]
    fn test_parse_amount_negative_forms() {
        assert_eq!(parse_amount(&text("-1,000")), dec!(-1000));
        assert_eq!(parse_amount(&text("(1,000)")), dec!(-1000));
        assert_eq!(parse_amount(&text("$-5.25")), dec!(-5.25));
    }

    #[test]
    fn test_parse_amount_never_fails() {
        assert_eq!(parse_amount(&text("")), Decimal::ZERO);
        assert_eq!(parse_amount(&CellValue::Empty), Decimal::ZERO);
        assert_eq!(parse_amount(&text("n/a")), Decimal::ZERO);
        assert_eq!(parse_amount(&text("#REF!")), Decimal::ZERO);
        assert_eq!(parse_amount(&CellValue::Bool(true)), Decimal::ZERO);
    }

    #[test]
    fn test_parse_optional_amount_distinguishes_blank() {
        assert_eq!(parse_optional_amount(&text("  ")), None);
        assert_eq!(parse_optional_amount(&text("abc")), None);
        assert_eq!(parse_optional_amount(&text("0")), Some(Decimal::ZERO));
    }

    #[test]
    fn test_error_marker_detection() {
        assert!(is_error_marker(&text("#REF!")));
        assert!(is_error_marker(&text("=A1 gave #N/A")));
        assert!(is_error_marker(&text("#DIV/0!")));
        assert!(is_error_marker(&text("#NAME?")));
        assert!(!is_error_marker(&text("REF")));
        assert!(!is_error_marker(&CellValue::Number(1.0)));

        let row = vec![text("25"), text("#VALUE!")];
        assert!(row_has_error_marker(&row, &[0, 1]));
        assert!(!row_has_error_marker(&row, &[0, 7]));
    }

    #[test]
    fn test_parse_percent_policy() {
        assert_eq!(parse_percent(&text("1.25")), dec!(125));
        assert_eq!(parse_percent(&text("15.5")), dec!(15.5));
        assert_eq!(parse_percent(&text("0")), Decimal::ZERO);
        assert_eq!(parse_percent(&text("15.5%")), dec!(15.5));
        assert_eq!(parse_percent(&CellValue::Number(1.566)), dec!(156.6));
        assert_eq!(parse_percent(&text("-0.5")), dec!(-50));
    }

    #[test]
    fn test_ratio_policy_bounds_are_open() {
        assert_eq!(ratio_to_percent_policy(dec!(10)), dec!(10));
        assert_eq!(ratio_to_percent_policy(dec!(-10)), dec!(-10));
        assert_eq!(ratio_to_percent_policy(dec!(9.99)), dec!(999));
        assert_eq!(ratio_to_percent_policy(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_parse_date_serial() {
        assert_eq!(
            parse_date(&CellValue::Number(45658.0)),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        // Fractional days are truncated.
        assert_eq!(
            parse_date(&CellValue::Number(45658.75)),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(parse_date(&text("45658")), NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn test_parse_date_text_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 8, 14);
        assert_eq!(parse_date(&text("2025-08-14")), expected);
        assert_eq!(parse_date(&text("2025/8/14")), expected);
        assert_eq!(parse_date(&text("2025.08.14")), expected);
        assert_eq!(parse_date(&text("08/14/2025")), expected);
        assert_eq!(parse_date(&text("08-14-2025")), expected);
        assert_eq!(parse_date(&text("2025-08-14 09:30:00")), expected);
    }

    #[test]
    fn test_parse_date_rejects_partial() {
        assert_eq!(parse_date(&text("2025-08")), None);
        assert_eq!(parse_date(&text("08/14")), None);
        assert_eq!(parse_date(&text("2025-02-30")), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_format_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_iso_date(date), "2025-03-07");
    }

    #[test]
    fn test_parse_month_token_prefers_numeric() {
        assert_eq!(parse_month_token(&CellValue::Number(8.0), &text("9월")), 8);
        assert_eq!(parse_month_token(&text("8"), &CellValue::Empty), 8);
        assert_eq!(parse_month_token(&CellValue::Empty, &text("9월")), 9);
        assert_eq!(parse_month_token(&text("13"), &text("12月")), 12);
        assert_eq!(parse_month_token(&text("x"), &text("7")), 7);
        assert_eq!(parse_month_token(&CellValue::Empty, &text("month")), 0);
    }

    #[test]
    fn test_parse_year_token() {
        assert_eq!(parse_year_token(&text("2025")), 2025);
        assert_eq!(parse_year_token(&CellValue::Number(2025.0)), 2025);
        assert_eq!(parse_year_token(&text("25")), 2025);
        assert_eq!(parse_year_token(&CellValue::Number(25.0)), 2025);
        assert_eq!(parse_year_token(&text("year")), 0);
        assert_eq!(parse_year_token(&text("123")), 0);
        assert_eq!(parse_year_token(&CellValue::Empty), 0);
    }
}
