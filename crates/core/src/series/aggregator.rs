//! Monthly, rolling, cumulative and year-over-year series.

use chrono::Datelike;
use log::warn;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::series_model::{
    SeriesPoint, YearOverYear, BALANCE_FIELD, CUMULATIVE_FIELD, FOREIGN_FIELD, LOCAL_FIELD,
    NET_DEPOSITS_FIELD, RETURN_PCT_FIELD, ROLLING_AVERAGE_FIELD, TOTAL_FIELD,
};
use crate::constants::{DEFAULT_DIVIDEND_RATE, DISPLAY_DECIMAL_PRECISION};
use crate::ledger::{AccountBalanceRecord, DepositRecord, DividendRecord};
use crate::period::YearMonth;

/// Rate for `period`, or the dividend default when the lookup has none.
pub fn rate_or_default(rates: &BTreeMap<YearMonth, Decimal>, period: &YearMonth) -> Decimal {
    rates.get(period).copied().unwrap_or(DEFAULT_DIVIDEND_RATE)
}

/// Dividend value in local currency at the period's rate, or `None` when it
/// does not fit a `Decimal`.
pub fn converted_amount(
    record: &DividendRecord,
    rates: &BTreeMap<YearMonth, Decimal>,
) -> Option<Decimal> {
    let period = YearMonth::from_date(record.date);
    record
        .amount_foreign
        .checked_mul(rate_or_default(rates, &period))?
        .checked_add(record.amount_local)
}

fn checked_sum<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
}

/// One point per month from the first to the last month with dividends.
/// Months without a dividend carry `None` in every field.
pub fn monthly_from_records(
    records: &[DividendRecord],
    rates: &BTreeMap<YearMonth, Decimal>,
) -> Vec<SeriesPoint> {
    let mut sums: BTreeMap<YearMonth, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for record in records {
        let month = YearMonth::from_date(record.date);
        let (local, foreign, total) = sums
            .get(&month)
            .copied()
            .unwrap_or((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        let next = converted_amount(record, rates).and_then(|converted| {
            Some((
                local.checked_add(record.amount_local)?,
                foreign.checked_add(record.amount_foreign)?,
                total.checked_add(converted)?,
            ))
        });
        match next {
            Some(next) => {
                sums.insert(month, next);
            }
            None => warn!(
                "Skipping {} dividend on {}: amount out of range",
                record.symbol, record.date
            ),
        }
    }

    let (Some(first), Some(last)) = (sums.keys().next(), sums.keys().next_back()) else {
        return Vec::new();
    };

    first
        .range_inclusive(last)
        .into_iter()
        .map(|month| {
            let point = SeriesPoint::new(month.label());
            match sums.get(&month) {
                Some((local, foreign, total)) => point
                        .with(LOCAL_FIELD, Some(local.round_dp(DISPLAY_DECIMAL_PRECISION)))
                        .with(FOREIGN_FIELD, Some(foreign.round_dp(DISPLAY_DECIMAL_PRECISION)))
                    .with(TOTAL_FIELD, Some(total.round_dp(DISPLAY_DECIMAL_PRECISION))),
                None => point
                    .with(LOCAL_FIELD, None)
                    .with(FOREIGN_FIELD, None)
                    .with(TOTAL_FIELD, None),
            }
        })
        .collect()
}

/// Adds `rollingAverage`: the mean of the present values of `field` over the
/// trailing `window` points, divided by how many were present.
pub fn rolling_average(series: &[SeriesPoint], field: &str, window: usize) -> Vec<SeriesPoint> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<Decimal> = series[start..=i]
                .iter()
                .filter_map(|p| p.get(field))
                .collect();
            let average = if present.is_empty() {
                None
            } else {
                checked_sum(&present).map(|sum| {
                    (sum / Decimal::from(present.len())).round_dp(DISPLAY_DECIMAL_PRECISION)
                })
            };
            point.clone().with(ROLLING_AVERAGE_FIELD, average)
        })
        .collect()
}

/// Adds `cumulative`: the running total of `field`. Missing values add nothing.
pub fn cumulative(series: &[SeriesPoint], field: &str) -> Vec<SeriesPoint> {
    let mut running = Decimal::ZERO;
    series
        .iter()
        .map(|point| {
            if let Some(value) = point.get(field) {
                match running.checked_add(value) {
                    Some(sum) => running = sum,
                    None => warn!("Cumulative {} overflowed at {}", field, point.label),
                }
            }
            point.clone().with(CUMULATIVE_FIELD, Some(running))
        })
        .collect()
}

/// Monthly converted totals per year. Every year present has all twelve
/// months; months without dividends are `None`.
pub fn year_over_year(
    records: &[DividendRecord],
    rates: &BTreeMap<YearMonth, Decimal>,
) -> YearOverYear {
    let mut grid: YearOverYear = BTreeMap::new();
    for record in records {
        let Some(amount) = converted_amount(record, rates) else {
            warn!(
                "Skipping {} dividend on {}: amount out of range",
                record.symbol, record.date
            );
            continue;
        };
        let months = grid
            .entry(record.date.year())
            .or_insert_with(|| (1..=12).map(|m| (m, None)).collect());
        let slot = months.entry(record.date.month()).or_insert(None);
        match slot.unwrap_or(Decimal::ZERO).checked_add(amount) {
            Some(sum) => *slot = Some(sum),
            None => warn!(
                "Skipping {} dividend on {}: month total overflowed",
                record.symbol, record.date
            ),
        }
    }

    for months in grid.values_mut() {
        for value in months.values_mut() {
            *value = value.map(|v| v.round_dp(DISPLAY_DECIMAL_PRECISION));
        }
    }
    grid
}

/// Replaces zero or missing values after the first point with the nearest
/// earlier non-zero value. For charts only.
pub fn forward_fill(series: &[SeriesPoint], field: &str) -> Vec<SeriesPoint> {
    let mut last_non_zero: Option<Decimal> = None;
    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut point = point.clone();
            match point.get(field) {
                Some(v) if !v.is_zero() => last_non_zero = Some(v),
                _ if i > 0 => {
                    if let Some(fill) = last_non_zero {
                        point.set(field, Some(fill));
                    }
                }
                _ => {}
            }
            point
        })
        .collect()
}

/// Month-end balances from the first to the last recorded month.
pub fn balance_series(balances: &[AccountBalanceRecord]) -> Vec<SeriesPoint> {
    let by_month: BTreeMap<YearMonth, Decimal> = balances
        .iter()
        .map(|b| (b.year_month, b.balance))
        .collect();

    let (Some(first), Some(last)) = (by_month.keys().next(), by_month.keys().next_back()) else {
        return Vec::new();
    };

    first
        .range_inclusive(last)
        .into_iter()
        .map(|month| {
            SeriesPoint::new(month.label()).with(BALANCE_FIELD, by_month.get(&month).copied())
        })
        .collect()
}

/// Balance series with `netDeposits` (signed deposits up to each month's
/// end) and `returnPct` (balance over net deposits, in percent).
pub fn cumulative_return_series(
    balances: &[AccountBalanceRecord],
    deposits: &[DepositRecord],
) -> Vec<SeriesPoint> {
    let mut flows: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for deposit in deposits {
        let flow = flows
            .entry(YearMonth::from_date(deposit.date))
            .or_insert(Decimal::ZERO);
        match flow.checked_add(deposit.signed_amount()) {
            Some(sum) => *flow = sum,
            None => warn!("Skipping deposit on {}: amount out of range", deposit.date),
        }
    }

    balance_series(balances)
        .into_iter()
        .filter_map(|point| {
            let month = point.period()?;
            Some((month, point))
        })
        .map(|(month, point)| {
            let net = checked_sum(flows.range(..=month).map(|(_, amount)| amount));
            let return_pct = match (point.get(BALANCE_FIELD), net) {
                (Some(balance), Some(net)) if net > Decimal::ZERO => balance
                    .checked_sub(net)
                    .and_then(|gain| gain.checked_div(net))
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .map(|pct| pct.round_dp(DISPLAY_DECIMAL_PRECISION)),
                _ => None,
            };
            point
                .with(NET_DEPOSITS_FIELD, net)
                .with(RETURN_PCT_FIELD, return_pct)
        })
        .collect()
}
