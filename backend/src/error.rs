//! Error handling for the textile production ledger
//!
//! Provides consistent error responses in English and Indonesian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use shared::FieldError;

use crate::store::StoreError;

/// Step of a production run, used to report where a multi-write sequence stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStep {
    ReserveStock,
    AppendRecord,
    AccumulateFinishedGoods,
    /// All three writes inside one store transaction
    Commit,
}

impl ProductionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionStep::ReserveStock => "reserve_stock",
            ProductionStep::AppendRecord => "append_record",
            ProductionStep::AccumulateFinishedGoods => "accumulate_finished_goods",
            ProductionStep::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ProductionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_id: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Stock errors
    #[error("Insufficient material: requested {requested}, available {available}")]
    InsufficientMaterial {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Insufficient stock: change of {delta} would leave {available} below zero")]
    InsufficientStock { delta: Decimal, available: Decimal },

    // Store errors
    #[error("Store error: {0}")]
    Store(StoreError),

    /// A production run failed at `step`; every completed write was undone
    #[error("Production failed at {step}: {reason}")]
    ProductionFailed {
        step: ProductionStep,
        reason: String,
    },

    /// A production run failed at `step` and undoing earlier writes also failed
    #[error("Production left partial writes after failing at {step}: {reason}")]
    ReconciliationRequired {
        step: ProductionStep,
        reason: String,
        record_id: Option<uuid::Uuid>,
        stock_reserved: bool,
    },

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<FieldError> for AppError {
    fn from(e: FieldError) -> Self {
        AppError::Validation {
            field: e.field.to_string(),
            message: e.message.to_string(),
            message_id: e.message_id.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(what) => AppError::DuplicateEntry(what),
            StoreError::OutOfRange(what) => {
                tracing::warn!(what = %what, "write rejected as out of range");
                AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity exceeds the allowed maximum".to_string(),
                    message_id: "Jumlah melebihi batas maksimum".to_string(),
                }
            }
            other => AppError::Store(other),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<ProductionStep>,
}

impl AppError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientMaterial { .. } => "INSUFFICIENT_MATERIAL",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::Store(_) => "STORE_ERROR",
            AppError::ProductionFailed { .. } => "STORE_ERROR",
            AppError::ReconciliationRequired { .. } => "RECONCILIATION_REQUIRED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_id,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code,
                    message_en: message.clone(),
                    message_id: message_id.clone(),
                    field: Some(field.clone()),
                    step: None,
                },
            ),
            AppError::DuplicateEntry(what) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code,
                    message_en: format!("A record with this {} already exists", what),
                    message_id: format!("Data dengan {} ini sudah ada", what),
                    field: None,
                    step: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code,
                    message_en: format!("{} not found", resource),
                    message_id: format!("{} tidak ditemukan", resource),
                    field: None,
                    step: None,
                },
            ),
            AppError::InsufficientMaterial {
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code,
                    message_en: format!(
                        "Insufficient raw material: requested {}, available {}",
                        requested, available
                    ),
                    message_id: format!(
                        "Stok bahan baku tidak mencukupi: diminta {}, tersedia {}",
                        requested, available
                    ),
                    field: Some("material_used".to_string()),
                    step: None,
                },
            ),
            AppError::InsufficientStock { delta, available } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code,
                    message_en: format!(
                        "Adjustment of {} would make stock negative (available {})",
                        delta, available
                    ),
                    message_id: format!(
                        "Penyesuaian {} membuat stok negatif (tersedia {})",
                        delta, available
                    ),
                    field: Some("delta".to_string()),
                    step: None,
                },
            ),
            AppError::Store(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code,
                    message_en: "The data store is unavailable".to_string(),
                    message_id: "Penyimpanan data tidak tersedia".to_string(),
                    field: None,
                    step: None,
                },
            ),
            AppError::ProductionFailed { step, .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code,
                    message_en: format!(
                        "Production was not recorded: the {} step failed and all changes were undone",
                        step
                    ),
                    message_id: format!(
                        "Produksi tidak tercatat: langkah {} gagal dan semua perubahan dibatalkan",
                        step
                    ),
                    field: None,
                    step: Some(*step),
                },
            ),
            AppError::ReconciliationRequired { step, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code,
                    message_en: format!(
                        "Production failed at the {} step and could not be undone; stock needs reconciliation",
                        step
                    ),
                    message_id: format!(
                        "Produksi gagal pada langkah {} dan tidak dapat dibatalkan; stok perlu direkonsiliasi",
                        step
                    ),
                    field: None,
                    step: Some(*step),
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code,
                    message_en: msg.clone(),
                    message_id: "Terjadi kesalahan internal pada server".to_string(),
                    field: None,
                    step: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;
