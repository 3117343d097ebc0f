//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining how to continue a provider chain

mod retry;

pub use retry::RetryClass;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the rate cache should handle the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider has no rate published for the requested date.
    #[error("No rate for {date} from {provider}")]
    NoDataForDate {
        /// The provider that was asked
        provider: String,
        /// The requested date
        date: NaiveDate,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider is configured in a way that can never succeed
    /// (for example an endpoint template without a date placeholder).
    #[error("Invalid configuration for {provider}: {message}")]
    InvalidConfiguration {
        /// The misconfigured provider
        provider: String,
        /// What is wrong with it
        message: String,
    },

    /// Data validation failed.
    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// All providers were tried for all candidate dates and all failed.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetfolio_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "PRIMARY".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextProvider);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::NoDataForDate { .. } | Self::ValidationFailed { .. } => RetryClass::NextDate,

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => RetryClass::NextProvider,

            Self::InvalidConfiguration { .. } | Self::AllProvidersFailed => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_for_date_moves_to_next_date() {
        let error = MarketDataError::NoDataForDate {
            provider: "PRIMARY".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 8, 16).unwrap(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextDate);
    }

    #[test]
    fn test_rate_limited_tries_next_provider() {
        let error = MarketDataError::RateLimited {
            provider: "PRIMARY".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextProvider);
    }

    #[test]
    fn test_timeout_tries_next_provider() {
        let error = MarketDataError::Timeout {
            provider: "LEGACY".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextProvider);
    }

    #[test]
    fn test_invalid_configuration_never_retries() {
        let error = MarketDataError::InvalidConfiguration {
            provider: "PRIMARY".to_string(),
            message: "missing {date}".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_validation_failed_moves_to_next_date() {
        let error = MarketDataError::ValidationFailed {
            message: "rate must be positive".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextDate);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::RateLimited {
            provider: "PRIMARY".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: PRIMARY");

        let error = MarketDataError::ProviderError {
            provider: "LEGACY".to_string(),
            message: "HTTP 502".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: LEGACY - HTTP 502");

        let error = MarketDataError::NoDataForDate {
            provider: "PRIMARY".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
        };
        assert_eq!(format!("{}", error), "No rate for 2025-08-15 from PRIMARY");
    }
}
