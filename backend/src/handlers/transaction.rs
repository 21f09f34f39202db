//! HTTP handlers for the cash ledger

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use shared::{CashTransaction, CreateTransactionInput, LedgerEntry};

use crate::error::AppResult;
use crate::services::CashLedgerService;
use crate::AppState;

fn service(state: &AppState) -> CashLedgerService {
    CashLedgerService::new(state.store.clone(), state.invalidations.clone())
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

/// Transactions with running balance, most recent first
pub async fn list_transactions(State(state): State<AppState>) -> AppResult<Json<Vec<LedgerEntry>>> {
    let entries = service(&state).list_with_running_balance().await?;
    Ok(Json(entries))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(input): Json<CreateTransactionInput>,
) -> AppResult<(StatusCode, Json<CashTransaction>)> {
    let transaction = service(&state).append(input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_balance(State(state): State<AppState>) -> AppResult<Json<BalanceResponse>> {
    let balance = service(&state).balance().await?;
    Ok(Json(BalanceResponse { balance }))
}
