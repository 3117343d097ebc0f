//! Series module - monthly, rolling, cumulative and year-over-year series,
//! yield comparisons and dividend summaries derived from the ledger.

mod aggregator;
mod dividend_summary;
mod series_model;
mod series_service;
mod yields;

#[cfg(test)]
mod series_service_tests;

pub use aggregator::{
    balance_series, converted_amount, cumulative, cumulative_return_series, forward_fill,
    monthly_from_records, rate_or_default, rolling_average, year_over_year,
};
pub use dividend_summary::{
    summarize_dividends, LAST_YEAR_PERIOD, TOTAL_PERIOD, TWO_YEARS_AGO_PERIOD, YTD_PERIOD,
};
pub use series_model::*;
pub use series_service::{
    DividendService, DividendServiceTrait, PerformanceService, PerformanceServiceTrait,
    ACCOUNT_SERIES_NAME, INDEX_SERIES_NAME, RAW_INDEX_SERIES_NAME,
};
pub use yields::{compare_yields, yield_comparison, MIN_ANNUALIZATION_DAYS};
