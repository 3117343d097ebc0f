//! Provider trait definitions.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::FxQuote;

/// Trait for dated exchange rate providers.
///
/// A provider answers "what was the rate on this business day". It is
/// called once per candidate date by the rate cache, which walks back
/// through recent business days until some provider answers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use sheetfolio_market_data::provider::FxRateProvider;
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl FxRateProvider for FixedProvider {
///     fn id(&self) -> &str {
///         "FIXED"
///     }
///
///     async fn get_rate_for_date(&self, date: NaiveDate) -> Result<FxQuote, MarketDataError> {
///         Ok(FxQuote::new(date, dec!(1350), self.id()))
///     }
/// }
/// ```
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    /// Unique identifier for this provider, used for logging and for the
    /// `source` of the rates it produces.
    fn id(&self) -> &str;

    /// Fetch the rate published for `date`.
    ///
    /// Implementations must only return strictly positive rates; anything
    /// else is a `ValidationFailed` error.
    async fn get_rate_for_date(&self, date: NaiveDate) -> Result<FxQuote, MarketDataError>;
}

/// Trait for bulk historical rate documents.
///
/// The document is a delimited text table (one row per month). Parsing is
/// left to the caller so that malformed rows can be skipped with the same
/// cell rules used for ledger data.
#[async_trait]
pub trait HistoricalRateSource: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// Fetch the raw document text.
    async fn fetch_document(&self) -> Result<String, MarketDataError>;
}
