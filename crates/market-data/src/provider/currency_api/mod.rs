//! Dated currency API provider.
//!
//! Fetches a daily snapshot document of the form
//!
//! ```json
//! { "date": "2025-08-14", "usd": { "krw": 1388.52, "eur": 0.857 } }
//! ```
//!
//! from an endpoint template containing a `{date}` placeholder (and
//! optionally `{base}`). The same provider type is configured twice by the
//! rate cache: once for the primary CDN endpoint and once for the legacy
//! mirror, which serves the identical document layout.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{CurrencyPair, FxQuote};
use crate::provider::FxRateProvider;

/// Primary endpoint template.
pub const PRIMARY_URL_TEMPLATE: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@{date}/v1/currencies/{base}.json";

/// Legacy/secondary endpoint template.
pub const LEGACY_URL_TEMPLATE: &str =
    "https://{date}.currency-api.pages.dev/v1/currencies/{base}.json";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Decimal places kept from the provider's float rate.
const RATE_SCALE: u32 = 4;

/// Provider for dated snapshot documents.
///
/// # Example
///
/// ```ignore
/// use sheetfolio_market_data::CurrencyApiProvider;
///
/// let primary = CurrencyApiProvider::primary(CurrencyPair::new("USD", "KRW"));
/// let quote = primary.get_rate_for_date(date).await?;
/// ```
pub struct CurrencyApiProvider {
    id: String,
    client: Client,
    url_template: String,
    pair: CurrencyPair,
}

impl CurrencyApiProvider {
    /// Create a provider for an arbitrary endpoint template.
    pub fn new(id: &str, url_template: &str, pair: CurrencyPair) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            id: id.to_string(),
            client,
            url_template: url_template.to_string(),
            pair,
        }
    }

    /// Provider for the primary endpoint.
    pub fn primary(pair: CurrencyPair) -> Self {
        Self::new("CURRENCY_API", PRIMARY_URL_TEMPLATE, pair)
    }

    /// Provider for the legacy endpoint.
    pub fn legacy(pair: CurrencyPair) -> Self {
        Self::new("CURRENCY_API_LEGACY", LEGACY_URL_TEMPLATE, pair)
    }

    /// Expands the endpoint template for a date.
    fn build_url(&self, date: NaiveDate) -> Result<String, MarketDataError> {
        if !self.url_template.contains("{date}") {
            return Err(MarketDataError::InvalidConfiguration {
                provider: self.id.clone(),
                message: "endpoint template has no {date} placeholder".to_string(),
            });
        }
        Ok(self
            .url_template
            .replace("{date}", &date.format("%Y-%m-%d").to_string())
            .replace("{base}", &self.pair.base.to_lowercase()))
    }

    /// Extracts the pair's rate from a snapshot document body.
    fn extract_rate(&self, body: &str) -> Result<Decimal, MarketDataError> {
        let doc: Value =
            serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
                provider: self.id.clone(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let raw = doc
            .get(self.pair.base.to_lowercase())
            .and_then(|rates| rates.get(self.pair.quote.to_lowercase()))
            .and_then(Value::as_f64)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("{} missing {} rate", self.id, self.pair.key()),
            })?;

        if !raw.is_finite() || raw <= 0.0 {
            return Err(MarketDataError::ValidationFailed {
                message: format!("{} returned non-positive rate {}", self.id, raw),
            });
        }

        Decimal::try_from(raw)
            .map(|d| d.round_dp(RATE_SCALE))
            .map_err(|_| MarketDataError::ValidationFailed {
                message: "Failed to convert rate to decimal".to_string(),
            })
    }
}

#[async_trait]
impl FxRateProvider for CurrencyApiProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get_rate_for_date(&self, date: NaiveDate) -> Result<FxQuote, MarketDataError> {
        let url = self.build_url(date)?;
        debug!("[{}] GET {}", self.id, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: self.id.clone(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: self.id.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(MarketDataError::NoDataForDate {
                    provider: self.id.clone(),
                    date,
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarketDataError::RateLimited {
                    provider: self.id.clone(),
                })
            }
            status if !status.is_success() => {
                return Err(MarketDataError::ProviderError {
                    provider: self.id.clone(),
                    message: format!("HTTP {}", status),
                })
            }
            _ => {}
        }

        let body = response.text().await?;
        let rate = self.extract_rate(&body)?;

        Ok(FxQuote::new(date, rate, &self.id))
    }
}
