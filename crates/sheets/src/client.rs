//! HTTP client for the spreadsheet values API.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use sheetfolio_core::errors::{Error, LedgerError, Result};

use crate::models::{ApiErrorResponse, AppendResponse, UpdateResponse, ValueRange};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Reads come back raw so numbers stay numbers.
const READ_QUERY: &str = "valueRenderOption=UNFORMATTED_VALUE";
/// Writes are interpreted as if typed, so dates and formulas behave.
const UPDATE_QUERY: &str = "valueInputOption=USER_ENTERED";
const APPEND_QUERY: &str = "valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Write,
}

/// Client for one spreadsheet.
#[derive(Clone)]
pub struct SheetsApiClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    auth_header: HeaderValue,
}

impl SheetsApiClient {
    pub fn new(base_url: &str, spreadsheet_id: &str, access_token: &str) -> Result<Self> {
        let auth_header = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| Error::Unexpected(format!("Invalid access token format: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}?{query}` with the
    /// range percent-encoded.
    fn values_url(&self, range: &str, suffix: &str, query: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}?{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range),
            suffix,
            query
        )
    }

    pub async fn get_values(&self, range: &str) -> Result<ValueRange> {
        let url = self.values_url(range, "", READ_QUERY);
        debug!("[SheetsApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| LedgerError::Transport(format!("Request failed: {}", e)))?;

        parse_response(response, range, Operation::Read).await
    }

    pub async fn update_values(&self, range: &str, body: &ValueRange) -> Result<UpdateResponse> {
        let url = self.values_url(range, "", UPDATE_QUERY);
        debug!("[SheetsApi] PUT {}", url);
        self.send_body(self.client.put(&url), range, body).await
    }

    pub async fn append_values(&self, range: &str, body: &ValueRange) -> Result<AppendResponse> {
        let url = self.values_url(range, ":append", APPEND_QUERY);
        debug!("[SheetsApi] POST {}", url);
        self.send_body(self.client.post(&url), range, body).await
    }

    async fn send_body<B: Serialize, T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        range: &str,
        body: &B,
    ) -> Result<T> {
        let response = request
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(format!("Request failed: {}", e)))?;

        parse_response(response, range, Operation::Write).await
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    range: &str,
    operation: Operation,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LedgerError::Transport(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(failure(range, operation, error_message(status.as_u16(), &body)).into());
    }

    serde_json::from_str(&body).map_err(|e| {
        failure(
            range,
            operation,
            format!("Failed to parse response: {}", e),
        )
        .into()
    })
}

fn failure(range: &str, operation: Operation, message: String) -> LedgerError {
    match operation {
        Operation::Read => LedgerError::ReadFailed {
            range: range.to_string(),
            message,
        },
        Operation::Write => LedgerError::WriteFailed {
            range: range.to_string(),
            message,
        },
    }
}

/// The API's own message when the body carries one, else the status and a
/// prefix of the body.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
        let code = err.error.code.unwrap_or(status);
        let detail = err
            .error
            .message
            .or(err.error.status)
            .unwrap_or_else(|| "unknown error".to_string());
        return format!("HTTP {}: {}", code, detail);
    }
    format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    )
}
