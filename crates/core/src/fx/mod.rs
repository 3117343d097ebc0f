//! FX (Foreign Exchange) module - tiered rate cache, bulk dataset and traits.

mod business_days;
mod cache;
mod fx_model;
mod fx_traits;
mod historical;
mod rate_cache;
mod rate_store;


pub use business_days::{candidate_dates, is_business_day};
pub use cache::{CacheTier, MemoryRateCache};
pub use fx_model::{
    CachedRate, ExchangeRate, RateCacheConfig, RatePeriod, RateResolution, RateSource,
    DEFAULT_FALLBACK_RATE,
};
pub use fx_traits::{FxRateServiceTrait, RateStore};
pub use historical::{backfill_months, parse_rate_document};
pub use rate_cache::{Clock, FxRateService};
pub use rate_store::InMemoryRateStore;
