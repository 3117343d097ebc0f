use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::fx_model::{CachedRate, ExchangeRate};
use crate::errors::Result;
use crate::period::YearMonth;

/// Persistent rate tier. Survives restarts, shared across processes.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedRate>>;
    async fn put(&self, key: &str, rate: &CachedRate) -> Result<()>;
}

/// Contract for exchange rate resolution. Every method answers with a
/// positive rate; failures degrade to older or static values.
#[async_trait]
pub trait FxRateServiceTrait: Send + Sync {
    async fn get_current_rate(&self) -> ExchangeRate;

    async fn get_current_rate_value(&self) -> Decimal {
        self.get_current_rate().await.rate
    }

    /// Monthly rates from the bulk dataset, gaps up to the current month
    /// filled with the current rate.
    async fn get_historical_rates(&self) -> BTreeMap<YearMonth, Decimal>;

    /// Same months as `get_historical_rates`, tagged with whether each came
    /// from the dataset or was carried forward.
    async fn get_historical_exchange_rates(&self) -> Vec<ExchangeRate>;

    async fn get_rate_for_period(&self, period: YearMonth) -> Decimal;

    /// Drops the memory tier.
    fn invalidate(&self);
}
