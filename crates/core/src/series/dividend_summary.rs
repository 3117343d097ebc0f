use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::aggregator::converted_amount;
use super::series_model::{DividendBySymbol, DividendSummary};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, FOREIGN_CURRENCY, LOCAL_CURRENCY};
use crate::ledger::DividendRecord;
use crate::period::YearMonth;

pub const TOTAL_PERIOD: &str = "TOTAL";
pub const YTD_PERIOD: &str = "YTD";
pub const LAST_YEAR_PERIOD: &str = "LAST_YEAR";
pub const TWO_YEARS_AGO_PERIOD: &str = "TWO_YEARS_AGO";

impl DividendSummary {
    /// Adds one dividend to every breakdown. Returns `false`, leaving the
    /// summary untouched, when any running total would overflow.
    pub fn add_dividend(&mut self, record: &DividendRecord, converted: Decimal) -> bool {
        let month = YearMonth::from_date(record.date).label();
        let symbol = record.symbol.to_uppercase();

        let running = |current: Option<Decimal>, amount: Decimal| {
            current.unwrap_or(Decimal::ZERO).checked_add(amount)
        };
        let (Some(month_total), Some(symbol_total), Some(local), Some(foreign), Some(total)) = (
            running(self.by_month.get(&month).copied(), converted),
            running(self.by_symbol.get(&symbol).map(|e| e.amount), converted),
            running(self.by_currency.get(LOCAL_CURRENCY).copied(), record.amount_local),
            running(self.by_currency.get(FOREIGN_CURRENCY).copied(), record.amount_foreign),
            self.total.checked_add(converted),
        ) else {
            return false;
        };

        self.by_month.insert(month, month_total);

        let entry = self
            .by_symbol
            .entry(symbol.clone())
            .or_insert_with(|| DividendBySymbol {
                symbol,
                name: record.name.clone(),
                amount: Decimal::ZERO,
            });
        entry.amount = symbol_total;
        if entry.name.is_empty() && !record.name.is_empty() {
            entry.name = record.name.clone();
        }

        if !record.amount_local.is_zero() {
            self.by_currency.insert(LOCAL_CURRENCY.to_string(), local);
        }
        if !record.amount_foreign.is_zero() {
            self.by_currency.insert(FOREIGN_CURRENCY.to_string(), foreign);
        }

        self.total = total;
        true
    }

    fn rounded(mut self) -> Self {
        self.total = self.total.round_dp(DISPLAY_DECIMAL_PRECISION);
        self.monthly_average = self.monthly_average.round_dp(DISPLAY_DECIMAL_PRECISION);
        self.yoy_growth = self.yoy_growth.map(|g| g.round_dp(DISPLAY_DECIMAL_PRECISION));
        for value in self.by_month.values_mut() {
            *value = value.round_dp(DISPLAY_DECIMAL_PRECISION);
        }
        for value in self.by_currency.values_mut() {
            *value = value.round_dp(DISPLAY_DECIMAL_PRECISION);
        }
        for entry in self.by_symbol.values_mut() {
            entry.amount = entry.amount.round_dp(DISPLAY_DECIMAL_PRECISION);
        }
        self
    }
}

fn calculate_yoy_growth(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        current
            .checked_sub(previous)
            .and_then(|delta| delta.checked_div(previous))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Months of `year` counted toward its average, given the first dividend.
fn months_in_year(year: i32, first: NaiveDate) -> u32 {
    if first.year() > year {
        0
    } else if first.year() == year {
        13 - first.month()
    } else {
        12
    }
}

/// TOTAL, YTD, LAST_YEAR and TWO_YEARS_AGO summaries in local currency.
/// Returns nothing when there are no dividends.
pub fn summarize_dividends(
    records: &[DividendRecord],
    rates: &BTreeMap<YearMonth, Decimal>,
    today: NaiveDate,
) -> Vec<DividendSummary> {
    let Some(first) = records.iter().map(|r| r.date).min() else {
        return Vec::new();
    };

    let current_year = today.year();
    let mut total = DividendSummary::new(TOTAL_PERIOD, LOCAL_CURRENCY);
    let mut ytd = DividendSummary::new(YTD_PERIOD, LOCAL_CURRENCY);
    let mut last_year = DividendSummary::new(LAST_YEAR_PERIOD, LOCAL_CURRENCY);
    let mut two_years_ago = DividendSummary::new(TWO_YEARS_AGO_PERIOD, LOCAL_CURRENCY);

    for record in records {
        let Some(converted) = converted_amount(record, rates) else {
            warn!(
                "Skipping {} dividend on {}: amount out of range",
                record.symbol, record.date
            );
            continue;
        };
        if !total.add_dividend(record, converted) {
            warn!(
                "Skipping {} dividend on {}: total overflowed",
                record.symbol, record.date
            );
            continue;
        }

        let added = match current_year - record.date.year() {
            0 => ytd.add_dividend(record, converted),
            1 => last_year.add_dividend(record, converted),
            2 => two_years_ago.add_dividend(record, converted),
            _ => true,
        };
        if !added {
            warn!("{} dividend on {} overflowed its period", record.symbol, record.date);
        }
    }

    let months_since_first = YearMonth::from_date(first)
        .months_until(&YearMonth::from_date(today))
        .max(0) as u32
        + 1;

    total.calculate_monthly_average(Some(months_since_first));
    ytd.calculate_monthly_average(Some(today.month().min(months_since_first)));
    last_year.calculate_monthly_average(Some(months_in_year(current_year - 1, first)));
    two_years_ago.calculate_monthly_average(Some(months_in_year(current_year - 2, first)));

    ytd.yoy_growth = Some(calculate_yoy_growth(ytd.total, last_year.total));
    last_year.yoy_growth = Some(calculate_yoy_growth(last_year.total, two_years_ago.total));
    two_years_ago.yoy_growth = None;

    debug!(
        "Summarized {} dividends since {}",
        records.len(),
        first.format("%Y-%m-%d")
    );

    vec![total, ytd, last_year, two_years_ago]
        .into_iter()
        .map(DividendSummary::rounded)
        .collect()
}
