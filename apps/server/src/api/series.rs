use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use sheetfolio_core::series::{DividendSummary, NamedYield, SeriesPoint, YearOverYear};

async fn get_dividend_series(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SeriesPoint>>> {
    Ok(Json(state.dividend_service.monthly_series().await?))
}

async fn get_dividend_year_over_year(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<YearOverYear>> {
    Ok(Json(state.dividend_service.year_over_year().await?))
}

async fn get_dividend_summaries(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DividendSummary>>> {
    Ok(Json(state.dividend_service.summaries().await?))
}

async fn get_account_series(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SeriesPoint>>> {
    Ok(Json(state.performance_service.account_series().await?))
}

async fn get_yield_comparisons(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<NamedYield>>> {
    Ok(Json(state.performance_service.yield_comparisons().await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dividends/series", get(get_dividend_series))
        .route("/dividends/year-over-year", get(get_dividend_year_over_year))
        .route("/dividends/summaries", get(get_dividend_summaries))
        .route("/performance/account", get(get_account_series))
        .route("/performance/yields", get(get_yield_comparisons))
}
