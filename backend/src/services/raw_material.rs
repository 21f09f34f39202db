//! Stock ledger: raw material records and their quantities

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::validation::{validate_adjustment, validate_raw_material};
use shared::{RawMaterial, RawMaterialInput};

use crate::error::{AppError, AppResult};
use crate::invalidation::{Collection, Invalidations};
use crate::store::{StockAdjustment, Store};

/// Service owning raw material stock
#[derive(Clone)]
pub struct StockLedgerService {
    store: Arc<dyn Store>,
    invalidations: Invalidations,
}

impl StockLedgerService {
    pub fn new(store: Arc<dyn Store>, invalidations: Invalidations) -> Self {
        Self {
            store,
            invalidations,
        }
    }

    /// Register a new raw material
    pub async fn create(&self, input: RawMaterialInput) -> AppResult<RawMaterial> {
        let input = input.normalized();
        validate_raw_material(&input)?;

        let material = self.store.insert_raw_material(&input).await?;
        tracing::info!(
            id = %material.id,
            name = %material.name,
            quantity = %material.quantity,
            "raw material created"
        );

        self.invalidations.notify(&[Collection::RawMaterials]);
        Ok(material)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<RawMaterial> {
        self.store
            .get_raw_material(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Raw material".to_string()))
    }

    /// All raw materials, newest first
    pub async fn list(&self) -> AppResult<Vec<RawMaterial>> {
        Ok(self.store.list_raw_materials().await?)
    }

    /// Replace every editable field of a raw material
    pub async fn update(&self, id: Uuid, input: RawMaterialInput) -> AppResult<RawMaterial> {
        let input = input.normalized();
        validate_raw_material(&input)?;

        let material = self
            .store
            .replace_raw_material(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;
        tracing::info!(id = %id, quantity = %material.quantity, "raw material replaced");

        self.invalidations.notify(&[Collection::RawMaterials]);
        Ok(material)
    }

    /// Remove a raw material. Production records that reference it are kept.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_raw_material(id).await? {
            return Err(AppError::NotFound("Raw material".to_string()));
        }
        tracing::info!(id = %id, "raw material deleted");

        self.invalidations
            .notify(&[Collection::RawMaterials, Collection::ProductionRecords]);
        Ok(())
    }

    /// Add `delta` (negative to consume) to the stock, never going below zero
    pub async fn adjust_quantity(&self, id: Uuid, delta: Decimal) -> AppResult<RawMaterial> {
        validate_adjustment(delta)?;
        match self.store.adjust_raw_material_quantity(id, delta).await? {
            StockAdjustment::Applied(material) => {
                tracing::info!(
                    id = %id,
                    delta = %delta,
                    quantity = %material.quantity,
                    "raw material quantity adjusted"
                );
                self.invalidations.notify(&[Collection::RawMaterials]);
                Ok(material)
            }
            StockAdjustment::Insufficient { available } => {
                tracing::debug!(id = %id, delta = %delta, available = %available, "adjustment rejected");
                Err(AppError::InsufficientStock { delta, available })
            }
            StockAdjustment::Missing => Err(AppError::NotFound("Raw material".to_string())),
        }
    }
}
