use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::period::YearMonth;

pub const LOCAL_FIELD: &str = "local";
pub const FOREIGN_FIELD: &str = "foreign";
pub const TOTAL_FIELD: &str = "total";
pub const BALANCE_FIELD: &str = "balance";
pub const NET_DEPOSITS_FIELD: &str = "netDeposits";
pub const RETURN_PCT_FIELD: &str = "returnPct";
pub const ROLLING_AVERAGE_FIELD: &str = "rollingAverage";
pub const CUMULATIVE_FIELD: &str = "cumulative";
pub const RAW_INDEX_FIELD: &str = "rawIndex";
pub const DOLLAR_INDEX_FIELD: &str = "dollarIndex";
pub const ADJUSTED_INDEX_FIELD: &str = "adjustedIndex";
pub const RAW_RETURN_PCT_FIELD: &str = "rawReturnPct";

/// One labelled point of a derived series. A `None` value means the period
/// has no data, which is not the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub values: BTreeMap<String, Option<Decimal>>,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: Option<Decimal>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: Option<Decimal>) {
        self.values.insert(field.to_string(), value);
    }

    /// Value of `field`, `None` when absent or empty.
    pub fn get(&self, field: &str) -> Option<Decimal> {
        self.values.get(field).copied().flatten()
    }

    /// The label read back as a month, for `"YYYY-MM"` labels.
    pub fn period(&self) -> Option<YearMonth> {
        YearMonth::parse(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldComparison {
    /// Latest value within the requested calendar year.
    pub this_year: Option<Decimal>,
    /// Latest value spread over the elapsed years of the series.
    pub annualized: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedYield {
    pub name: String,
    #[serde(flatten)]
    pub comparison: YieldComparison,
}

/// Twelve-month grid per year, `None` where a month has no data.
pub type YearOverYear = BTreeMap<i32, BTreeMap<u32, Option<Decimal>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendBySymbol {
    pub symbol: String,
    pub name: String,
    pub amount: Decimal,
}

/// Dividend totals for one reporting period, converted to local currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendSummary {
    pub period: String,
    pub by_month: BTreeMap<String, Decimal>,
    pub by_symbol: HashMap<String, DividendBySymbol>,
    /// Unconverted totals per currency.
    pub by_currency: BTreeMap<String, Decimal>,
    pub total: Decimal,
    pub currency: String,
    pub monthly_average: Decimal,
    pub yoy_growth: Option<Decimal>,
}

impl DividendSummary {
    pub fn new(period: &str, currency: &str) -> Self {
        DividendSummary {
            period: period.to_string(),
            by_month: BTreeMap::new(),
            by_symbol: HashMap::new(),
            by_currency: BTreeMap::new(),
            total: Decimal::ZERO,
            currency: currency.to_string(),
            monthly_average: Decimal::ZERO,
            yoy_growth: None,
        }
    }

    pub fn calculate_monthly_average(&mut self, num_months: Option<u32>) {
        let months = num_months.unwrap_or(self.by_month.len() as u32);
        if months > 0 {
            self.monthly_average = self.total / Decimal::from(months);
        }
    }
}
