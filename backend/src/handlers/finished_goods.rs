//! HTTP handlers for finished goods

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::{FinishedGood, FinishedGoodInput, UpsertFinishedGoodInput};

use crate::error::AppResult;
use crate::services::FinishedGoodsService;
use crate::AppState;

fn service(state: &AppState) -> FinishedGoodsService {
    FinishedGoodsService::new(state.store.clone(), state.invalidations.clone())
}

pub async fn list_finished_goods(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FinishedGood>>> {
    let goods = service(&state).list().await?;
    Ok(Json(goods))
}

/// Insert or increment by (name, product type)
pub async fn upsert_finished_good(
    State(state): State<AppState>,
    Json(input): Json<UpsertFinishedGoodInput>,
) -> AppResult<Json<FinishedGood>> {
    let good = service(&state).upsert(input).await?;
    Ok(Json(good))
}

/// Manual correction
pub async fn update_finished_good(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FinishedGoodInput>,
) -> AppResult<Json<FinishedGood>> {
    let good = service(&state).update(id, input).await?;
    Ok(Json(good))
}

pub async fn delete_finished_good(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
