use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::series_model::{NamedYield, SeriesPoint, YieldComparison};
use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Below this span a cumulative value is reported as-is instead of annualized.
pub const MIN_ANNUALIZATION_DAYS: i64 = 28;

fn populated(series: &[SeriesPoint], field: &str) -> Vec<(NaiveDate, Decimal)> {
    series
        .iter()
        .filter_map(|p| Some((p.period()?.first_day(), p.get(field)?)))
        .collect()
}

/// This-year and annualized view of a cumulative percentage series.
pub fn yield_comparison(series: &[SeriesPoint], field: &str, as_of: NaiveDate) -> YieldComparison {
    let points = populated(series, field);

    let this_year = points
        .iter()
        .rev()
        .find(|(date, _)| date.year() == as_of.year() && *date <= as_of)
        .map(|(_, v)| v.round_dp(DISPLAY_DECIMAL_PRECISION));

    let annualized = match (points.first(), points.last()) {
        (Some((start, _)), Some((end, latest))) => {
            let days = end.signed_duration_since(*start).num_days();
            if days < MIN_ANNUALIZATION_DAYS {
                Some(latest.round_dp(DISPLAY_DECIMAL_PRECISION))
            } else {
                let years = Decimal::from(days) / dec!(365.25);
                Some((*latest / years).round_dp(DISPLAY_DECIMAL_PRECISION))
            }
        }
        _ => None,
    };

    YieldComparison {
        this_year,
        annualized,
    }
}

/// One comparison per named series, in the given order.
pub fn compare_yields(
    series: &[(&str, &[SeriesPoint])],
    field: &str,
    as_of: NaiveDate,
) -> Vec<NamedYield> {
    series
        .iter()
        .map(|(name, points)| NamedYield {
            name: name.to_string(),
            comparison: yield_comparison(points, field, as_of),
        })
        .collect()
}
