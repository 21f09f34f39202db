//! Finished goods aggregator

use std::sync::Arc;

use uuid::Uuid;

use shared::validation::{validate_finished_good, validate_upsert};
use shared::{FinishedGood, FinishedGoodInput, UpsertFinishedGoodInput};

use crate::error::{AppError, AppResult};
use crate::invalidation::{Collection, Invalidations};
use crate::store::Store;

#[derive(Clone)]
pub struct FinishedGoodsService {
    store: Arc<dyn Store>,
    invalidations: Invalidations,
}

impl FinishedGoodsService {
    pub fn new(store: Arc<dyn Store>, invalidations: Invalidations) -> Self {
        Self {
            store,
            invalidations,
        }
    }

    /// Add to the row for (name, product type), creating it when absent
    pub async fn upsert(&self, input: UpsertFinishedGoodInput) -> AppResult<FinishedGood> {
        validate_upsert(&input)?;
        let name = input.name.trim();

        let good = self
            .store
            .increment_finished_good(name, input.product_type, input.quantity_to_add)
            .await?;
        tracing::info!(
            name = %good.name,
            product_type = %good.product_type,
            added = input.quantity_to_add,
            quantity = good.quantity,
            "finished good accumulated"
        );

        self.invalidations.notify(&[Collection::FinishedGoods]);
        Ok(good)
    }

    /// Finished goods, newest first
    pub async fn list(&self) -> AppResult<Vec<FinishedGood>> {
        Ok(self.store.list_finished_goods().await?)
    }

    /// Overwrite a row by hand. The total is no longer derived from production history afterwards.
    pub async fn update(&self, id: Uuid, input: FinishedGoodInput) -> AppResult<FinishedGood> {
        let input = FinishedGoodInput {
            name: input.name.trim().to_string(),
            ..input
        };
        validate_finished_good(&input)?;

        let good = self
            .store
            .replace_finished_good(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Finished good".to_string()))?;
        tracing::warn!(id = %id, quantity = good.quantity, "finished good edited manually");

        self.invalidations.notify(&[Collection::FinishedGoods]);
        Ok(good)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_finished_good(id).await? {
            return Err(AppError::NotFound("Finished good".to_string()));
        }
        tracing::warn!(id = %id, "finished good deleted");

        self.invalidations.notify(&[Collection::FinishedGoods]);
        Ok(())
    }
}
