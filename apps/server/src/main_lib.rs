use std::sync::Arc;

use crate::config::Config;
use sheetfolio_core::{
    enrich::{RateEnricher, INDEX_LAYOUT},
    fx::{FxRateService, FxRateServiceTrait, RateCacheConfig},
    ledger::{
        AccountBalanceRecord, DepositRecord, DividendRecord, HoldingRecord, InMemoryLedgerStore,
        LedgerMutator, LedgerStore,
    },
    mirror::MirrorSync,
    series::{DividendService, DividendServiceTrait, PerformanceService, PerformanceServiceTrait},
};
use sheetfolio_market_data::{
    CurrencyApiProvider, CurrencyPair, FxRateProvider, HttpDocumentSource,
};
use sheetfolio_sheets::{SheetsApiClient, SheetsLedgerStore};
use sheetfolio_storage_sqlite::{db, SqliteMirrorStore, SqliteRateStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub fx_service: Arc<dyn FxRateServiceTrait>,
    pub balances: LedgerMutator<AccountBalanceRecord>,
    pub dividends: LedgerMutator<DividendRecord>,
    pub deposits: LedgerMutator<DepositRecord>,
    pub holdings: LedgerMutator<HoldingRecord>,
    pub dividend_service: Arc<dyn DividendServiceTrait>,
    pub performance_service: Arc<dyn PerformanceServiceTrait>,
    pub index_enricher: Arc<RateEnricher>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("SF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_ledger_store(config: &Config) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match &config.spreadsheet_id {
        Some(id) => {
            let client = SheetsApiClient::new(&config.sheets_api_url, id, &config.sheets_token)?;
            tracing::info!("Ledgers read from spreadsheet {}", id);
            Ok(Arc::new(SheetsLedgerStore::new(client)))
        }
        None => {
            tracing::warn!("SF_SPREADSHEET_ID not set; ledgers are kept in memory");
            Ok(Arc::new(InMemoryLedgerStore::new()))
        }
    }
}

fn build_providers(config: &Config, pair: &CurrencyPair) -> Vec<Arc<dyn FxRateProvider>> {
    let mut providers: Vec<Arc<dyn FxRateProvider>> = Vec::new();
    if let Some(url) = &config.fx_primary_url {
        providers.push(Arc::new(CurrencyApiProvider::new(
            "CURRENCY_API",
            url,
            pair.clone(),
        )));
    }
    if let Some(url) = &config.fx_legacy_url {
        providers.push(Arc::new(CurrencyApiProvider::new(
            "CURRENCY_API_LEGACY",
            url,
            pair.clone(),
        )));
    }
    if providers.is_empty() {
        tracing::warn!("No FX providers configured; current rates come from cache or fallback");
    }
    providers
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (pool, writer) = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let mirror_store = Arc::new(SqliteMirrorStore::new(pool.clone(), writer.clone()));
    let rate_store = Arc::new(SqliteRateStore::new(pool.clone(), writer.clone()));
    let mirror = MirrorSync::background(mirror_store);

    let rate_config = RateCacheConfig {
        timezone: config.timezone,
        fallback_rate: config.fx_fallback_rate,
        ..RateCacheConfig::default()
    };
    let providers = build_providers(config, &rate_config.pair);
    let mut fx = FxRateService::new(rate_config, providers).with_store(rate_store);
    if let Some(url) = &config.fx_history_url {
        fx = fx.with_history_source(Arc::new(HttpDocumentSource::new(url)));
    }
    let fx_service: Arc<dyn FxRateServiceTrait> = Arc::new(fx);

    let ledger = build_ledger_store(config)?;
    let balances = LedgerMutator::new(ledger.clone(), mirror.clone());
    let dividends = LedgerMutator::new(ledger.clone(), mirror.clone());
    let deposits = LedgerMutator::new(ledger.clone(), mirror.clone());
    let holdings = LedgerMutator::new(ledger.clone(), mirror);

    let index_enricher = Arc::new(RateEnricher::new(
        ledger,
        fx_service.clone(),
        INDEX_LAYOUT.clone(),
    ));

    let dividend_service = Arc::new(
        DividendService::new(dividends.clone(), fx_service.clone())
            .with_timezone(config.timezone),
    );
    let performance_service = Arc::new(
        PerformanceService::new(balances.clone(), deposits.clone())
            .with_index(index_enricher.clone())
            .with_timezone(config.timezone),
    );

    Ok(Arc::new(AppState {
        fx_service,
        balances,
        dividends,
        deposits,
        holdings,
        dividend_service,
        performance_service,
        index_enricher,
        db_path: config.db_path.clone(),
    }))
}
