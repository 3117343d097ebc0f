use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sheetfolio_core::{cells::Row, series::SeriesPoint};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrichResponse {
    updated_rows: usize,
}

async fn get_enriched_rows(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Row>>> {
    Ok(Json(state.index_enricher.enriched_rows().await?))
}

async fn get_index_series(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SeriesPoint>>> {
    Ok(Json(state.index_enricher.index_series().await?))
}

async fn enrich_index_sheet(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<EnrichResponse>> {
    let updated_rows = state.index_enricher.enrich_sheet().await?;
    tracing::info!("Index enrichment rewrote {} row(s)", updated_rows);
    Ok(Json(EnrichResponse { updated_rows }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/index/enriched", get(get_enriched_rows))
        .route("/index/series", get(get_index_series))
        .route("/index/enrich", post(enrich_index_sheet))
}
