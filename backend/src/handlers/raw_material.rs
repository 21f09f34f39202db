//! HTTP handlers for raw material stock endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::{AdjustQuantityInput, RawMaterial, RawMaterialInput};

use crate::error::AppResult;
use crate::services::StockLedgerService;
use crate::AppState;

fn service(state: &AppState) -> StockLedgerService {
    StockLedgerService::new(state.store.clone(), state.invalidations.clone())
}

/// List raw materials, newest first
pub async fn list_raw_materials(State(state): State<AppState>) -> AppResult<Json<Vec<RawMaterial>>> {
    let materials = service(&state).list().await?;
    Ok(Json(materials))
}

/// Register a raw material
pub async fn create_raw_material(
    State(state): State<AppState>,
    Json(input): Json<RawMaterialInput>,
) -> AppResult<(StatusCode, Json<RawMaterial>)> {
    let material = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn get_raw_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RawMaterial>> {
    let material = service(&state).get(id).await?;
    Ok(Json(material))
}

/// Replace a raw material
pub async fn update_raw_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RawMaterialInput>,
) -> AppResult<Json<RawMaterial>> {
    let material = service(&state).update(id, input).await?;
    Ok(Json(material))
}

pub async fn delete_raw_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restock or correct a quantity
pub async fn adjust_raw_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AdjustQuantityInput>,
) -> AppResult<Json<RawMaterial>> {
    let material = service(&state).adjust_quantity(id, input.delta).await?;
    Ok(Json(material))
}
