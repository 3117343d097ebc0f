//! HTTP source for bulk historical rate documents.
//!
//! The document is typically a spreadsheet tab published as CSV: one row per
//! month with a period label and a rate. Only transport lives here.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::provider::HistoricalRateSource;

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SOURCE_ID: &str = "HISTORY_DOCUMENT";

/// Fetches a delimited text document from a fixed URL.
pub struct HttpDocumentSource {
    client: Client,
    url: String,
}

impl HttpDocumentSource {
    pub fn new(url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl HistoricalRateSource for HttpDocumentSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn fetch_document(&self) -> Result<String, MarketDataError> {
        debug!("[{}] GET {}", SOURCE_ID, self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: SOURCE_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: SOURCE_ID.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: SOURCE_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: "historical rate document is empty".to_string(),
            });
        }
        Ok(body)
    }
}
