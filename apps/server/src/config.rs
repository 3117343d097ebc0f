use std::{net::SocketAddr, time::Duration};

use chrono_tz::Tz;
use rust_decimal::Decimal;
use sheetfolio_core::fx::DEFAULT_FALLBACK_RATE;
use sheetfolio_core::utils::time_utils::{parse_timezone, DEFAULT_LEDGER_TZ};
use sheetfolio_market_data::provider::currency_api::{LEGACY_URL_TEMPLATE, PRIMARY_URL_TEMPLATE};
use sheetfolio_sheets::DEFAULT_SHEETS_API_URL;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Without a spreadsheet id the ledgers live in memory.
    pub spreadsheet_id: Option<String>,
    pub sheets_token: String,
    pub sheets_api_url: String,
    /// Endpoint templates; an empty variable disables the provider.
    pub fx_primary_url: Option<String>,
    pub fx_legacy_url: Option<String>,
    pub fx_history_url: Option<String>,
    pub fx_fallback_rate: Decimal,
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("SF_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SF_LISTEN_ADDR: {}", e))?;
        let db_path = std::env::var("SF_DB_PATH").unwrap_or_else(|_| "./db/sheetfolio.db".into());
        let cors_allow = std::env::var("SF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("SF_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let spreadsheet_id = std::env::var("SF_SPREADSHEET_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let sheets_token = std::env::var("SF_SHEETS_TOKEN").unwrap_or_default();
        let sheets_api_url =
            std::env::var("SF_SHEETS_API_URL").unwrap_or_else(|_| DEFAULT_SHEETS_API_URL.into());
        let fx_fallback_rate = match std::env::var("SF_FX_FALLBACK_RATE") {
            Ok(raw) => raw
                .trim()
                .parse::<Decimal>()
                .ok()
                .filter(|rate| *rate > Decimal::ZERO)
                .ok_or_else(|| anyhow::anyhow!("Invalid SF_FX_FALLBACK_RATE: {}", raw))?,
            Err(_) => DEFAULT_FALLBACK_RATE,
        };
        let timezone = match std::env::var("SF_TIMEZONE") {
            Ok(name) => parse_timezone(&name)
                .ok_or_else(|| anyhow::anyhow!("Invalid SF_TIMEZONE: {}", name))?,
            Err(_) => DEFAULT_LEDGER_TZ,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            spreadsheet_id,
            sheets_token,
            sheets_api_url,
            fx_primary_url: optional_url("SF_FX_PRIMARY_URL", Some(PRIMARY_URL_TEMPLATE)),
            fx_legacy_url: optional_url("SF_FX_LEGACY_URL", Some(LEGACY_URL_TEMPLATE)),
            fx_history_url: optional_url("SF_FX_HISTORY_URL", None),
            fx_fallback_rate,
            timezone,
        })
    }
}

/// The variable's value, `default` when unset, `None` when set but empty.
fn optional_url(key: &str, default: Option<&str>) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value.trim().to_string()),
        Err(_) => default.map(str::to_string),
    }
}
