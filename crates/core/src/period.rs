//! Calendar month keys.
//!
//! Rates and series are keyed by calendar month. The canonical period key is
//! the `"YY.MM"` form used by the rate sheets; series labels use `"YYYY-MM"`.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

lazy_static! {
    /// "25.08", "25.8"
    static ref SHORT_PERIOD_REGEX: Regex =
        Regex::new(r"^(\d{2})\.(\d{1,2})$").expect("Invalid regex pattern");

    /// "2025.08", "2025-08", "2025/8", optionally followed by a day part
    static ref LONG_PERIOD_REGEX: Regex =
        Regex::new(r"^(\d{4})[.\-/](\d{1,2})(?:[.\-/]\d{1,2})?$").expect("Invalid regex pattern");

    /// "202508"
    static ref COMPACT_PERIOD_REGEX: Regex =
        Regex::new(r"^(\d{4})(\d{2})$").expect("Invalid regex pattern");
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is 1..=12 and `year` is positive.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if year > 0 && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of months from `self` to `other` (negative when `other` is earlier).
    pub fn months_until(&self, other: &YearMonth) -> i32 {
        (other.year - self.year) * 12 + other.month as i32 - self.month as i32
    }

    /// Every month from `self` to `end`, both inclusive.
    pub fn range_inclusive(&self, end: &YearMonth) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut current = *self;
        while current <= *end {
            months.push(current);
            current = current.next();
        }
        months
    }

    /// `"YY.MM"`, the rate sheet period key.
    pub fn period_key(&self) -> String {
        format!("{:02}.{:02}", self.year.rem_euclid(100), self.month)
    }

    /// `"YYYY-MM"`, the series label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// `"YYYYMM"`, the compact form stored in balance rows.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Parses any of the accepted period encodings.
    ///
    /// Accepts `"YY.MM"`, `"YY.M"`, `"YYYY.MM"`, `"YYYY-MM"`, `"YYYY/MM"`,
    /// `"YYYYMM"`, and full dates in the long forms. Two-digit years map to
    /// the 2000s.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().trim_matches('"').trim();

        if let Some(caps) = SHORT_PERIOD_REGEX.captures(s) {
            let year = 2000 + caps[1].parse::<i32>().ok()?;
            let month = caps[2].parse::<u32>().ok()?;
            return Self::new(year, month);
        }

        if let Some(caps) = LONG_PERIOD_REGEX.captures(s) {
            let year = caps[1].parse::<i32>().ok()?;
            let month = caps[2].parse::<u32>().ok()?;
            return Self::new(year, month);
        }

        if let Some(caps) = COMPACT_PERIOD_REGEX.captures(s) {
            let year = caps[1].parse::<i32>().ok()?;
            let month = caps[2].parse::<u32>().ok()?;
            return Self::new(year, month);
        }

        None
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "'{}' is not a calendar month",
                s
            )))
        })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        YearMonth::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year-month '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_period_key() {
        assert_eq!(YearMonth::parse("25.08"), YearMonth::new(2025, 8));
        assert_eq!(YearMonth::parse("25.8"), YearMonth::new(2025, 8));
        assert_eq!(YearMonth::parse("\"24.12\""), YearMonth::new(2024, 12));
    }

    #[test]
    fn test_parse_long_forms() {
        assert_eq!(YearMonth::parse("2025-08"), YearMonth::new(2025, 8));
        assert_eq!(YearMonth::parse("2025.08"), YearMonth::new(2025, 8));
        assert_eq!(YearMonth::parse("2025/8"), YearMonth::new(2025, 8));
        assert_eq!(YearMonth::parse("202508"), YearMonth::new(2025, 8));
        assert_eq!(YearMonth::parse("2025-08-14"), YearMonth::new(2025, 8));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(YearMonth::parse("25.13"), None);
        assert_eq!(YearMonth::parse("2025-00"), None);
        assert_eq!(YearMonth::parse("8월"), None);
        assert_eq!(YearMonth::parse(""), None);
        assert_eq!(YearMonth::parse("rate"), None);
    }

    #[test]
    fn test_formats() {
        let ym = YearMonth::new(2025, 8).unwrap();
        assert_eq!(ym.period_key(), "25.08");
        assert_eq!(ym.label(), "2025-08");
        assert_eq!(ym.compact(), "202508");
        assert_eq!(ym.to_string(), "2025-08");
    }

    #[test]
    fn test_next_rolls_over_year() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2025, 1).unwrap());
    }

    #[test]
    fn test_range_inclusive_and_months_until() {
        let start = YearMonth::new(2024, 11).unwrap();
        let end = YearMonth::new(2025, 2).unwrap();
        let months = start.range_inclusive(&end);
        assert_eq!(months.len(), 4);
        assert_eq!(start.months_until(&end), 3);
        assert_eq!(end.months_until(&start), -3);
        assert!(end.range_inclusive(&start).is_empty());
    }

    #[test]
    fn test_serde_uses_label() {
        let ym = YearMonth::new(2025, 9).unwrap();
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2025-09\"");
        let back: YearMonth = serde_json::from_str("\"25.09\"").unwrap();
        assert_eq!(back, ym);
    }
}
