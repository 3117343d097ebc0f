use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sheetfolio_core::{fx::ExchangeRate, period::YearMonth};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodRate {
    period: YearMonth,
    rate: Decimal,
}

async fn get_current_rate(State(state): State<Arc<AppState>>) -> ApiResult<Json<ExchangeRate>> {
    Ok(Json(state.fx_service.get_current_rate().await))
}

async fn get_rate_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ExchangeRate>>> {
    Ok(Json(state.fx_service.get_historical_exchange_rates().await))
}

async fn get_period_rate(
    Path(period): Path<YearMonth>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PeriodRate>> {
    let rate = state.fx_service.get_rate_for_period(period).await;
    Ok(Json(PeriodRate { period, rate }))
}

/// Drops the memory tier and resolves the current rate again.
async fn refresh_current_rate(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ExchangeRate>> {
    state.fx_service.invalidate();
    Ok(Json(state.fx_service.get_current_rate().await))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fx/current", get(get_current_rate))
        .route("/fx/refresh", post(refresh_current_rate))
        .route("/fx/history", get(get_rate_history))
        .route("/fx/periods/{period}", get(get_period_rate))
}
