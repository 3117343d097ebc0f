use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use sheetfolio_market_data::{FxQuote, FxRateProvider, HistoricalRateSource, RetryClass};

use super::business_days::candidate_dates;
use super::cache::{CacheTier, MemoryRateCache};
use super::fx_model::{
    CachedRate, ExchangeRate, RateCacheConfig, RatePeriod, RateResolution, RateSource,
};
use super::fx_traits::{FxRateServiceTrait, RateStore};
use super::historical::{backfill_months, parse_rate_document};
use crate::period::YearMonth;

/// Source of the current instant.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct CachedDocument {
    body: String,
    fetched_at: DateTime<Utc>,
}

/// Tiered exchange rate resolution: memory, persistent store, providers,
/// then stale values and finally the configured static rate.
pub struct FxRateService {
    config: RateCacheConfig,
    memory: MemoryRateCache,
    store: Option<Arc<dyn RateStore>>,
    providers: Vec<Arc<dyn FxRateProvider>>,
    history: Option<Arc<dyn HistoricalRateSource>>,
    document: RwLock<Option<CachedDocument>>,
    clock: Clock,
}

impl FxRateService {
    pub fn new(config: RateCacheConfig, providers: Vec<Arc<dyn FxRateProvider>>) -> Self {
        Self {
            config,
            memory: MemoryRateCache::new(),
            store: None,
            providers,
            history: None,
            document: RwLock::new(None),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_history_source(mut self, source: Arc<dyn HistoricalRateSource>) -> Self {
        self.history = Some(source);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn cache_key(&self) -> String {
        self.config.pair.key()
    }

    fn current(rate: &CachedRate, source: RateSource) -> ExchangeRate {
        ExchangeRate {
            period: RatePeriod::Today,
            rate: rate.rate,
            source,
            fetched_at: rate.fetched_at,
        }
    }

    async fn read_store(&self, key: &str) -> Option<CachedRate> {
        let store = self.store.as_ref()?;
        match store.get(key).await {
            Ok(entry) => entry.filter(|e| e.rate > Decimal::ZERO),
            Err(e) => {
                warn!("Rate store read failed: {}", e);
                None
            }
        }
    }

    async fn write_through(&self, key: &str, entry: &CachedRate) {
        self.memory.put(key, entry.clone());
        if let Some(store) = &self.store {
            if let Err(e) = store.put(key, entry).await {
                warn!("Rate store write failed: {}", e);
            }
        }
    }

    /// Walks recent business days newest first, trying every provider for a
    /// date before moving to the previous one. A provider whose error is not
    /// retryable is skipped for the rest of the walk.
    async fn fetch_from_providers(&self, now: DateTime<Utc>) -> Option<FxQuote> {
        if self.providers.is_empty() {
            return None;
        }

        let local_now = now.with_timezone(&self.config.timezone).naive_local();
        let dates = candidate_dates(
            local_now,
            self.config.refresh_cutoff_hour,
            self.config.lookback_business_days,
        );

        let mut disabled: HashSet<String> = HashSet::new();
        for date in dates {
            for provider in &self.providers {
                if disabled.contains(provider.id()) {
                    continue;
                }
                match provider.get_rate_for_date(date).await {
                    Ok(quote) if quote.rate > Decimal::ZERO => {
                        debug!(
                            "{} answered {} for {}",
                            provider.id(),
                            quote.rate,
                            quote.date
                        );
                        return Some(quote);
                    }
                    Ok(quote) => {
                        warn!(
                            "{} returned non-positive rate {} for {}",
                            provider.id(),
                            quote.rate,
                            date
                        );
                    }
                    Err(e) => {
                        warn!("{} failed for {}: {}", provider.id(), date, e);
                        if e.retry_class() == RetryClass::Never {
                            disabled.insert(provider.id().to_string());
                        }
                    }
                }
            }
        }
        None
    }

    /// Bulk document text, cached for `dataset_ttl`. A stale copy is reused
    /// when a refresh fails.
    async fn load_document(&self, now: DateTime<Utc>) -> Option<String> {
        let source = self.history.as_ref()?;

        let cached = self.document.read().ok().and_then(|guard| {
            guard
                .as_ref()
                .map(|doc| (doc.body.clone(), doc.fetched_at))
        });
        if let Some((body, fetched_at)) = &cached {
            if now.signed_duration_since(*fetched_at) < self.config.dataset_ttl {
                return Some(body.clone());
            }
        }

        match source.fetch_document().await {
            Ok(body) => {
                if let Ok(mut guard) = self.document.write() {
                    *guard = Some(CachedDocument {
                        body: body.clone(),
                        fetched_at: now,
                    });
                }
                Some(body)
            }
            Err(e) => {
                warn!("{} fetch failed: {}", source.id(), e);
                cached.map(|(body, _)| body)
            }
        }
    }

    /// Dataset rates plus carried-forward months, and the months carried.
    async fn resolve_history(&self) -> (BTreeMap<YearMonth, Decimal>, Vec<YearMonth>) {
        let now = self.now();
        let mut rates = match self.load_document(now).await {
            Some(body) => parse_rate_document(&body),
            None => BTreeMap::new(),
        };

        let current = self.get_current_rate().await;
        let carried = backfill_months(&mut rates, self.present_month(), current.rate);
        if !carried.is_empty() {
            debug!("Carried the current rate into {} month(s)", carried.len());
        }
        (rates, carried)
    }

    /// Current month in the configured timezone.
    pub fn present_month(&self) -> YearMonth {
        let local = self.now().with_timezone(&self.config.timezone);
        YearMonth::from_date(local.date_naive())
    }
}

#[async_trait]
impl FxRateServiceTrait for FxRateService {
    async fn get_current_rate(&self) -> ExchangeRate {
        let key = self.cache_key();
        let now = self.now();
        let ttl = self.config.ttl;

        let memory_entry = self.memory.get(&key);
        if let Some(entry) = &memory_entry {
            if entry.is_fresh(ttl, now) {
                debug!("{:?} for {}", RateResolution::MemoryHit, key);
                return Self::current(entry, RateSource::Memory);
            }
        }

        let store_entry = self.read_store(&key).await;
        if let Some(entry) = &store_entry {
            if entry.is_fresh(ttl, now) {
                debug!("{:?} for {}", RateResolution::StoreHit, key);
                self.memory.put(&key, entry.clone());
                return Self::current(entry, RateSource::Store);
            }
        }

        if let Some(quote) = self.fetch_from_providers(now).await {
            debug!("{:?} for {}", RateResolution::ProviderHit, key);
            let entry = CachedRate::new(quote.rate, quote.source.clone(), now);
            self.write_through(&key, &entry).await;
            return Self::current(&entry, RateSource::Provider(quote.source));
        }

        if let Some(entry) = &store_entry {
            warn!(
                "{:?} for {}: using rate from {}",
                RateResolution::StaleStore,
                key,
                entry.fetched_at
            );
            self.memory.put(&key, entry.clone());
            return Self::current(entry, RateSource::Store);
        }

        if let Some(entry) = &memory_entry {
            warn!(
                "{:?} for {}: using rate from {}",
                RateResolution::StaleMemory,
                key,
                entry.fetched_at
            );
            return Self::current(entry, RateSource::Memory);
        }

        warn!(
            "{:?} for {}: no rate available, using {}",
            RateResolution::Fallback,
            key,
            self.config.fallback_rate
        );
        ExchangeRate {
            period: RatePeriod::Today,
            rate: self.config.fallback_rate,
            source: RateSource::Fallback,
            fetched_at: now,
        }
    }

    async fn get_historical_rates(&self) -> BTreeMap<YearMonth, Decimal> {
        self.resolve_history().await.0
    }

    async fn get_historical_exchange_rates(&self) -> Vec<ExchangeRate> {
        let now = self.now();
        let (rates, carried) = self.resolve_history().await;
        rates
            .into_iter()
            .map(|(period, rate)| ExchangeRate {
                period: RatePeriod::Month(period),
                rate,
                source: if carried.contains(&period) {
                    RateSource::CarriedForward
                } else {
                    RateSource::Dataset
                },
                fetched_at: now,
            })
            .collect()
    }

    async fn get_rate_for_period(&self, period: YearMonth) -> Decimal {
        let rates = self.get_historical_rates().await;
        match rates.get(&period) {
            Some(rate) => *rate,
            None => self.get_current_rate().await.rate,
        }
    }

    fn invalidate(&self) {
        self.memory.clear();
    }
}
