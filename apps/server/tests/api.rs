use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sheetfolio_core::{fx::DEFAULT_FALLBACK_RATE, utils::time_utils::DEFAULT_LEDGER_TZ};
use sheetfolio_server::{api::app_router, build_state, config::Config};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

/// Offline configuration: in-memory ledgers, no FX providers.
fn offline_config(dir: &TempDir) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(10),
        spreadsheet_id: None,
        sheets_token: String::new(),
        sheets_api_url: String::new(),
        fx_primary_url: None,
        fx_legacy_url: None,
        fx_history_url: None,
        fx_fallback_rate: DEFAULT_FALLBACK_RATE,
        timezone: DEFAULT_LEDGER_TZ,
    }
}

async fn build_test_router() -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    let config = offline_config(&dir);
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

// ==================== Health ====================

#[tokio::test]
async fn healthz_responds() {
    let (app, _dir) = build_test_router().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ==================== Balances ====================

#[tokio::test]
async fn balance_lifecycle() {
    let (app, _dir) = build_test_router().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/balances",
        Some(json!({ "yearMonth": "2025-08", "balance": 50000000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["record"]["yearMonth"], "2025-08");

    let (status, conflict) = send(
        &app,
        Method::POST,
        "/api/v1/balances",
        Some(json!({ "yearMonth": "25.08", "balance": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["code"], 409);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/balances",
        Some(json!({ "yearMonth": "2025-09", "balance": 52000000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) = send(&app, Method::GET, "/api/v1/balances", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
    assert_eq!(listed[0]["balance"], json!(50000000.0));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/balances",
        Some(json!({
            "key": "2025-07",
            "record": { "yearMonth": "2025-07", "balance": 1 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, deleted) = send(
        &app,
        Method::DELETE,
        "/api/v1/balances",
        Some(json!({ "key": "2025-09" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["kind"], "deleted");

    let (_, listed) = send(&app, Method::GET, "/api/v1/balances", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn negative_balance_is_rejected() {
    let (app, _dir) = build_test_router().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/balances",
        Some(json!({ "yearMonth": "2025-08", "balance": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

// ==================== FX ====================

#[tokio::test]
async fn current_rate_falls_back_without_providers() {
    let (app, _dir) = build_test_router().await;
    let (status, rate) = send(&app, Method::GET, "/api/v1/fx/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rate["source"], "FALLBACK");
    let value: Decimal = serde_json::from_value(rate["rate"].clone()).unwrap();
    assert_eq!(value, DEFAULT_FALLBACK_RATE);
}

// ==================== Holdings ====================

#[tokio::test]
async fn holding_on_fresh_sheet_is_listed_and_guards_duplicates() {
    let (app, _dir) = build_test_router().await;
    let holding = json!({
        "symbol": "AAPL",
        "name": "Apple",
        "quantity": 3,
        "averagePrice": 180,
        "currency": "USD"
    });

    let (status, created) =
        send(&app, Method::POST, "/api/v1/holdings", Some(holding.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["row"], 4);

    let (_, listed) = send(&app, Method::GET, "/api/v1/holdings", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::POST, "/api/v1/holdings", Some(holding)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ==================== Imports ====================

#[tokio::test]
async fn import_reports_duplicates_per_candidate() {
    let (app, _dir) = build_test_router().await;
    let (status, outcomes) = send(
        &app,
        Method::POST,
        "/api/v1/holdings/import",
        Some(json!([
            { "symbol": "schd", "name": "Schwab US Dividend", "quantity": 10, "price": 27.5, "currency": "USD" },
            { "symbol": "SCHD", "quantity": 3, "price": 28 }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcomes[0]["status"], "IMPORTED");
    assert_eq!(outcomes[1]["status"], "DUPLICATE");

    let (_, holdings) = send(&app, Method::GET, "/api/v1/holdings", None).await;
    assert_eq!(holdings.as_array().map(Vec::len), Some(1));
    assert_eq!(holdings[0]["symbol"], "SCHD");
}

// ==================== Series ====================

#[tokio::test]
async fn dividend_series_over_empty_ledger() {
    let (app, _dir) = build_test_router().await;
    let (status, series) = send(&app, Method::GET, "/api/v1/dividends/series", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(series, json!([]));

    let (status, summaries) =
        send(&app, Method::GET, "/api/v1/dividends/summaries", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summaries, json!([]));
}
