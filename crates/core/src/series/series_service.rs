use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::aggregator::{
    cumulative, cumulative_return_series, monthly_from_records, rolling_average, year_over_year,
};
use super::dividend_summary::summarize_dividends;
use super::series_model::{
    DividendSummary, NamedYield, SeriesPoint, YearOverYear, RAW_RETURN_PCT_FIELD,
    RETURN_PCT_FIELD, TOTAL_FIELD,
};
use super::yields::{compare_yields, yield_comparison};
use crate::constants::ROLLING_WINDOW_MONTHS;
use crate::enrich::RateEnricher;
use crate::errors::Result;
use crate::fx::{Clock, FxRateServiceTrait};
use crate::ledger::{AccountBalanceRecord, DepositRecord, DividendRecord, LedgerMutator};
use crate::period::YearMonth;
use crate::utils::time_utils::{local_today, DEFAULT_LEDGER_TZ};

pub const ACCOUNT_SERIES_NAME: &str = "account";
pub const INDEX_SERIES_NAME: &str = "index";
pub const RAW_INDEX_SERIES_NAME: &str = "indexRaw";

#[async_trait]
pub trait DividendServiceTrait: Send + Sync {
    /// Dense monthly dividends with the rolling average and running total of
    /// the converted amount.
    async fn monthly_series(&self) -> Result<Vec<SeriesPoint>>;
    async fn year_over_year(&self) -> Result<YearOverYear>;
    async fn summaries(&self) -> Result<Vec<DividendSummary>>;
}

pub struct DividendService {
    dividends: LedgerMutator<DividendRecord>,
    fx: Arc<dyn FxRateServiceTrait>,
    clock: Clock,
    timezone: Tz,
}

impl DividendService {
    pub fn new(dividends: LedgerMutator<DividendRecord>, fx: Arc<dyn FxRateServiceTrait>) -> Self {
        Self {
            dividends,
            fx,
            clock: Arc::new(Utc::now),
            timezone: DEFAULT_LEDGER_TZ,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    async fn load(&self) -> Result<(Vec<DividendRecord>, BTreeMap<YearMonth, Decimal>)> {
        let (records, rates) = futures::join!(
            self.dividends.list_with_fallback(),
            self.fx.get_historical_rates()
        );
        Ok((records?, rates))
    }
}

#[async_trait]
impl DividendServiceTrait for DividendService {
    async fn monthly_series(&self) -> Result<Vec<SeriesPoint>> {
        let (records, rates) = self.load().await?;
        let monthly = monthly_from_records(&records, &rates);
        let rolled = rolling_average(&monthly, TOTAL_FIELD, ROLLING_WINDOW_MONTHS);
        debug!(
            "Built monthly dividend series of {} point(s) from {} record(s)",
            rolled.len(),
            records.len()
        );
        Ok(cumulative(&rolled, TOTAL_FIELD))
    }

    async fn year_over_year(&self) -> Result<YearOverYear> {
        let (records, rates) = self.load().await?;
        Ok(year_over_year(&records, &rates))
    }

    async fn summaries(&self) -> Result<Vec<DividendSummary>> {
        let (records, rates) = self.load().await?;
        let today = local_today((self.clock)(), self.timezone);
        Ok(summarize_dividends(&records, &rates, today))
    }
}

#[async_trait]
pub trait PerformanceServiceTrait: Send + Sync {
    /// Month-end balances with net deposits and cumulative return.
    async fn account_series(&self) -> Result<Vec<SeriesPoint>>;
    /// This-year and annualized returns of the account and, when an index
    /// block is configured, of the adjusted and raw index.
    async fn yield_comparisons(&self) -> Result<Vec<NamedYield>>;
}

pub struct PerformanceService {
    balances: LedgerMutator<AccountBalanceRecord>,
    deposits: LedgerMutator<DepositRecord>,
    index: Option<Arc<RateEnricher>>,
    clock: Clock,
    timezone: Tz,
}

impl PerformanceService {
    pub fn new(
        balances: LedgerMutator<AccountBalanceRecord>,
        deposits: LedgerMutator<DepositRecord>,
    ) -> Self {
        Self {
            balances,
            deposits,
            index: None,
            clock: Arc::new(Utc::now),
            timezone: DEFAULT_LEDGER_TZ,
        }
    }

    pub fn with_index(mut self, enricher: Arc<RateEnricher>) -> Self {
        self.index = Some(enricher);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }
}

#[async_trait]
impl PerformanceServiceTrait for PerformanceService {
    async fn account_series(&self) -> Result<Vec<SeriesPoint>> {
        let (balances, deposits) = futures::try_join!(
            self.balances.list_with_fallback(),
            self.deposits.list_with_fallback()
        )?;
        Ok(cumulative_return_series(&balances, &deposits))
    }

    async fn yield_comparisons(&self) -> Result<Vec<NamedYield>> {
        let as_of = local_today((self.clock)(), self.timezone);
        let account = self.account_series().await?;

        let Some(enricher) = &self.index else {
            return Ok(compare_yields(
                &[(ACCOUNT_SERIES_NAME, &account[..])],
                RETURN_PCT_FIELD,
                as_of,
            ));
        };

        let index = enricher.index_series().await?;
        let mut results = compare_yields(
            &[(ACCOUNT_SERIES_NAME, &account[..]), (INDEX_SERIES_NAME, &index[..])],
            RETURN_PCT_FIELD,
            as_of,
        );
        results.push(NamedYield {
            name: RAW_INDEX_SERIES_NAME.to_string(),
            comparison: yield_comparison(&index, RAW_RETURN_PCT_FIELD, as_of),
        });
        Ok(results)
    }
}
