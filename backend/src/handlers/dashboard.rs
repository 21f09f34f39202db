//! Dashboard handler

use axum::{extract::State, Json};
use chrono::Utc;

use shared::DashboardSummary;

use crate::error::AppResult;
use crate::services::DashboardService;
use crate::AppState;

pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardSummary>> {
    let service = DashboardService::new(state.store.clone());
    let summary = service.summary(Utc::now().date_naive()).await?;
    Ok(Json(summary))
}
