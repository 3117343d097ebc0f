use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A base/quote currency pair, e.g. USD/KRW (1 USD = rate KRW).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        }
    }

    /// Cache key form, e.g. "USD/KRW".
    pub fn key(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::new("USD", "KRW")
    }
}

/// Exchange rate observation returned by a provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxQuote {
    /// Business date the rate applies to
    pub date: NaiveDate,

    /// Units of quote currency per one unit of base currency
    pub rate: Decimal,

    /// Provider that produced the rate
    pub source: String,

    /// When the rate was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FxQuote {
    pub fn new(date: NaiveDate, rate: Decimal, source: &str) -> Self {
        Self {
            date,
            rate,
            source: source.to_string(),
            fetched_at: Utc::now(),
        }
    }
}
