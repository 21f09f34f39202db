//! HTTP handlers for production runs

use axum::{extract::State, http::StatusCode, Json};

use shared::{CreateProductionInput, ProductionRecordDetails};

use crate::error::AppResult;
use crate::services::{ProductionOutcome, ProductionService, RetryPolicy};
use crate::AppState;

fn service(state: &AppState) -> ProductionService {
    ProductionService::new(
        state.store.clone(),
        state.invalidations.clone(),
        RetryPolicy::from(&state.config.production),
    )
}

/// Production history, newest first
pub async fn list_production(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductionRecordDetails>>> {
    let records = service(&state).list().await?;
    Ok(Json(records))
}

/// Convert raw material into finished goods
pub async fn create_production(
    State(state): State<AppState>,
    Json(input): Json<CreateProductionInput>,
) -> AppResult<(StatusCode, Json<ProductionOutcome>)> {
    let outcome = service(&state).produce(input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
