use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use sheetfolio_market_data::CurrencyPair;

use crate::period::YearMonth;
use crate::utils::time_utils::DEFAULT_LEDGER_TZ;

/// Rate returned when no tier has anything.
pub const DEFAULT_FALLBACK_RATE: Decimal = dec!(1380);

/// Which period a rate answers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatePeriod {
    Today,
    Month(YearMonth),
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateSource {
    Memory,
    Store,
    Provider(String),
    Dataset,
    CarriedForward,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub period: RatePeriod,
    pub rate: Decimal,
    pub source: RateSource,
    pub fetched_at: DateTime<Utc>,
}

/// A cache entry. `source` is the provider that originally produced the rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRate {
    pub rate: Decimal,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRate {
    pub fn new(rate: Decimal, source: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            rate,
            source: source.into(),
            fetched_at,
        }
    }

    /// Fresh while younger than `ttl`. Entries stamped in the future count
    /// as fresh.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// How a current-rate lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateResolution {
    Unresolved,
    MemoryHit,
    StoreHit,
    ProviderHit,
    StaleStore,
    StaleMemory,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    pub pair: CurrencyPair,
    /// Freshness window of the current rate in both cache tiers.
    pub ttl: Duration,
    /// Freshness window of the bulk historical document.
    pub dataset_ttl: Duration,
    pub lookback_business_days: usize,
    /// Local hour at which providers publish the day's rate.
    pub refresh_cutoff_hour: u32,
    pub timezone: Tz,
    pub fallback_rate: Decimal,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            pair: CurrencyPair::default(),
            ttl: Duration::hours(1),
            dataset_ttl: Duration::hours(24),
            lookback_business_days: 5,
            refresh_cutoff_hour: 11,
            timezone: DEFAULT_LEDGER_TZ,
            fallback_rate: DEFAULT_FALLBACK_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_rate_freshness() {
        let fetched = DateTime::parse_from_rfc3339("2025-08-14T03:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = CachedRate::new(dec!(1390.5), "CURRENCY_API", fetched);
        let ttl = Duration::hours(1);
        assert!(entry.is_fresh(ttl, fetched + Duration::minutes(59)));
        assert!(!entry.is_fresh(ttl, fetched + Duration::minutes(60)));
        assert!(entry.is_fresh(ttl, fetched - Duration::minutes(5)));
    }

    #[test]
    fn test_rate_source_serialization() {
        assert_eq!(serde_json::to_string(&RateSource::Fallback).unwrap(), "\"FALLBACK\"");
        assert_eq!(
            serde_json::to_string(&RateSource::Provider("CURRENCY_API".into())).unwrap(),
            "{\"PROVIDER\":\"CURRENCY_API\"}"
        );
    }

    #[test]
    fn test_default_config() {
        let config = RateCacheConfig::default();
        assert_eq!(config.lookback_business_days, 5);
        assert_eq!(config.refresh_cutoff_hour, 11);
        assert_eq!(config.pair.key(), "USD/KRW");
        assert!(config.fallback_rate > Decimal::ZERO);
    }
}
