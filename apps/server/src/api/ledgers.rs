//! CRUD over the four ledger sheets, plus the trade candidate import.
//!
//! Every ledger exposes the same shape: `GET` lists (falling back to the
//! mirror), `POST` appends, `PUT` replaces the record at `key`, and `DELETE`
//! soft-deletes the record at `key`.

use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use sheetfolio_core::{
    imports::{import_trade_candidates, ImportOutcome, TradeCandidate},
    ledger::{
        AccountBalanceRecord, DeleteOutcome, DepositRecord, DividendRecord, HoldingRecord,
        LedgerMutator, LedgerRecord, MutationOutcome,
    },
};

/// Picks the mutator for a record type out of the shared state.
trait LedgerRoute: LedgerRecord {
    fn mutator(state: &AppState) -> &LedgerMutator<Self>;
}

impl LedgerRoute for AccountBalanceRecord {
    fn mutator(state: &AppState) -> &LedgerMutator<Self> {
        &state.balances
    }
}

impl LedgerRoute for DividendRecord {
    fn mutator(state: &AppState) -> &LedgerMutator<Self> {
        &state.dividends
    }
}

impl LedgerRoute for DepositRecord {
    fn mutator(state: &AppState) -> &LedgerMutator<Self> {
        &state.deposits
    }
}

impl LedgerRoute for HoldingRecord {
    fn mutator(state: &AppState) -> &LedgerMutator<Self> {
        &state.holdings
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "R::Key: DeserializeOwned"))]
struct UpdateRequest<R: LedgerRecord> {
    key: R::Key,
    record: R,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<K> {
    key: K,
}

async fn list_records<R: LedgerRoute>(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<R>>> {
    let records = R::mutator(&state).list_with_fallback().await?;
    Ok(Json(records))
}

async fn create_record<R: LedgerRoute>(
    State(state): State<Arc<AppState>>,
    Json(record): Json<R>,
) -> ApiResult<Json<MutationOutcome<R>>> {
    let outcome = R::mutator(&state).append(record).await?;
    Ok(Json(outcome))
}

async fn update_record<R>(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest<R>>,
) -> ApiResult<Json<MutationOutcome<R>>>
where
    R: LedgerRoute,
    R::Key: DeserializeOwned,
{
    let outcome = R::mutator(&state)
        .update(&request.key, request.record)
        .await?;
    Ok(Json(outcome))
}

async fn delete_record<R>(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteRequest<R::Key>>,
) -> ApiResult<Json<DeleteOutcome>>
where
    R: LedgerRoute,
    R::Key: DeserializeOwned,
{
    let outcome = R::mutator(&state).soft_delete(&request.key).await?;
    Ok(Json(outcome))
}

async fn import_holdings(
    State(state): State<Arc<AppState>>,
    Json(candidates): Json<Vec<TradeCandidate>>,
) -> ApiResult<Json<Vec<ImportOutcome>>> {
    let outcomes = import_trade_candidates(candidates, &state.holdings).await?;
    Ok(Json(outcomes))
}

fn ledger_routes<R>(path: &str, router: Router<Arc<AppState>>) -> Router<Arc<AppState>>
where
    R: LedgerRoute,
    R::Key: DeserializeOwned,
{
    router.route(
        path,
        get(list_records::<R>)
            .post(create_record::<R>)
            .put(update_record::<R>)
            .delete(delete_record::<R>),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    let router = Router::new();
    let router = ledger_routes::<AccountBalanceRecord>("/balances", router);
    let router = ledger_routes::<DividendRecord>("/dividends", router);
    let router = ledger_routes::<DepositRecord>("/deposits", router);
    let router = ledger_routes::<HoldingRecord>("/holdings", router);
    router.route("/holdings/import", post(import_holdings))
}
