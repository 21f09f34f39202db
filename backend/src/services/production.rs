//! Production transformer: converts raw material into finished goods
//!
//! A run touches three collections: the raw material stock, the production
//! log and the finished goods aggregate. When the store offers transactions
//! the three writes commit together. Otherwise they run as a saga that
//! reserves stock first, then appends the record, then accumulates the
//! finished good, undoing completed steps if a later one keeps failing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::validation::{exceeds_snapshot, validate_production};
use shared::{
    CreateProductionInput, FinishedGood, NewProductionRecord, ProductionRecord,
    ProductionRecordDetails, RawMaterial,
};

use crate::config::ProductionConfig;
use crate::error::{AppError, AppResult, ProductionStep};
use crate::invalidation::{Collection, Invalidations};
use crate::store::{ProductionCommit, StockAdjustment, Store, StoreError, StoreResult};

/// Bounded retry for individual store calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Retry transient failures of `op`, giving up after `max_attempts` calls
    async fn run<T, F, Fut>(&self, step: &'static str, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(step, attempt, error = %e, "store call failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl From<&ProductionConfig> for RetryPolicy {
    fn from(config: &ProductionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: config.retry_backoff(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&ProductionConfig::default())
    }
}

/// Everything a successful run wrote
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductionOutcome {
    pub record: ProductionRecord,
    pub raw_material: RawMaterial,
    pub finished_good: FinishedGood,
}

#[derive(Clone)]
pub struct ProductionService {
    store: Arc<dyn Store>,
    invalidations: Invalidations,
    retry: RetryPolicy,
}

impl ProductionService {
    pub fn new(store: Arc<dyn Store>, invalidations: Invalidations, retry: RetryPolicy) -> Self {
        Self {
            store,
            invalidations,
            retry,
        }
    }

    /// Run production: consume raw material, log the run, credit finished goods.
    ///
    /// Succeeds only when all three writes are durable. Insufficient stock,
    /// whether caught against the caller's snapshot or at the store, leaves
    /// every collection untouched.
    pub async fn produce(&self, input: CreateProductionInput) -> AppResult<ProductionOutcome> {
        validate_production(&input)?;
        if exceeds_snapshot(&input) {
            return Err(AppError::InsufficientMaterial {
                requested: input.material_used,
                available: input.current_material_quantity.unwrap_or_default(),
            });
        }

        let record = input.to_record();
        let outcome = if self.store.supports_transactions() {
            self.produce_in_transaction(&record).await?
        } else {
            match self.produce_as_saga(&record).await {
                Ok(outcome) => outcome,
                Err(e @ AppError::ReconciliationRequired { .. }) => {
                    // Partial writes are visible; cached views of them are stale
                    self.invalidations
                        .notify(&[Collection::RawMaterials, Collection::ProductionRecords]);
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(
            record_id = %outcome.record.id,
            raw_material_id = %record.raw_material_id,
            material_used = %record.material_used,
            product = %record.product_name,
            output = record.output_quantity,
            "production recorded"
        );
        self.invalidations.notify(&[
            Collection::RawMaterials,
            Collection::ProductionRecords,
            Collection::FinishedGoods,
        ]);
        Ok(outcome)
    }

    /// Production history, newest first
    pub async fn list(&self) -> AppResult<Vec<ProductionRecordDetails>> {
        Ok(self.store.list_production_records().await?)
    }

    async fn produce_in_transaction(
        &self,
        record: &NewProductionRecord,
    ) -> AppResult<ProductionOutcome> {
        // A failed transaction rolls back as a whole, so repeating it is safe
        let committed = self
            .retry
            .run("commit", || self.store.commit_production(record))
            .await
            .map_err(|e| failed(ProductionStep::Commit, e))?;

        match committed {
            ProductionCommit::Committed {
                record,
                raw_material,
                finished_good,
            } => Ok(ProductionOutcome {
                record,
                raw_material,
                finished_good,
            }),
            ProductionCommit::Insufficient { available } => Err(AppError::InsufficientMaterial {
                requested: record.material_used,
                available,
            }),
            ProductionCommit::MaterialMissing => {
                Err(AppError::NotFound("Raw material".to_string()))
            }
        }
    }

    async fn produce_as_saga(&self, record: &NewProductionRecord) -> AppResult<ProductionOutcome> {
        let id = record.raw_material_id;
        let used = record.material_used;

        // Step 1: reserve stock; the conditional decrement is the availability check
        let reserved = self
            .retry
            .run(ProductionStep::ReserveStock.as_str(), || {
                self.store.adjust_raw_material_quantity(id, -used)
            })
            .await
            .map_err(|e| failed(ProductionStep::ReserveStock, e))?;
        let raw_material = match reserved {
            StockAdjustment::Applied(material) => material,
            StockAdjustment::Insufficient { available } => {
                return Err(AppError::InsufficientMaterial {
                    requested: used,
                    available,
                })
            }
            StockAdjustment::Missing => {
                return Err(AppError::NotFound("Raw material".to_string()))
            }
        };

        // Step 2: append the record
        let appended = self
            .retry
            .run(ProductionStep::AppendRecord.as_str(), || {
                self.store.insert_production_record(record)
            })
            .await;
        let inserted = match appended {
            Ok(inserted) => inserted,
            Err(e) => {
                let stock_restored = self.release_stock(id, used).await;
                return Err(compensated(
                    ProductionStep::AppendRecord,
                    e,
                    None,
                    stock_restored,
                ));
            }
        };

        // Step 3: accumulate finished goods
        let accumulated = self
            .retry
            .run(ProductionStep::AccumulateFinishedGoods.as_str(), || {
                self.store.increment_finished_good(
                    &record.product_name,
                    record.product_type,
                    record.output_quantity,
                )
            })
            .await;
        match accumulated {
            Ok(finished_good) => Ok(ProductionOutcome {
                record: inserted,
                raw_material,
                finished_good,
            }),
            Err(e) => {
                let record_removed = self.remove_record(inserted.id).await;
                let stock_restored = self.release_stock(id, used).await;
                Err(compensated(
                    ProductionStep::AccumulateFinishedGoods,
                    e,
                    (!record_removed).then_some(inserted.id),
                    stock_restored,
                ))
            }
        }
    }

    /// Give reserved material back; false if it could not be restored
    async fn release_stock(&self, id: Uuid, used: Decimal) -> bool {
        let restored = self
            .retry
            .run("release_stock", || {
                self.store.adjust_raw_material_quantity(id, used)
            })
            .await;
        match restored {
            Ok(StockAdjustment::Applied(material)) => {
                tracing::warn!(id = %id, quantity = %material.quantity, "reserved stock released");
                true
            }
            Ok(other) => {
                tracing::error!(id = %id, outcome = ?other, "reserved stock could not be released");
                false
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "reserved stock could not be released");
                false
            }
        }
    }

    /// Remove an appended record; false if it may still exist
    async fn remove_record(&self, record_id: Uuid) -> bool {
        let removed = self
            .retry
            .run("remove_record", || {
                self.store.delete_production_record(record_id)
            })
            .await;
        match removed {
            Ok(_) => {
                tracing::warn!(record_id = %record_id, "production record withdrawn");
                true
            }
            Err(e) => {
                tracing::error!(record_id = %record_id, error = %e, "production record could not be withdrawn");
                false
            }
        }
    }
}

/// Failure before anything was written
fn failed(step: ProductionStep, e: StoreError) -> AppError {
    tracing::warn!(step = step.as_str(), error = %e, "production aborted");
    if matches!(e, StoreError::OutOfRange(_)) {
        return e.into();
    }
    AppError::ProductionFailed {
        step,
        reason: e.to_string(),
    }
}

/// Failure after stock was reserved; reports whether undoing succeeded
fn compensated(
    step: ProductionStep,
    e: StoreError,
    leftover_record: Option<Uuid>,
    stock_restored: bool,
) -> AppError {
    if leftover_record.is_none() && stock_restored {
        tracing::warn!(step = step.as_str(), error = %e, "production rolled back");
        if matches!(e, StoreError::OutOfRange(_)) {
            return e.into();
        }
        return AppError::ProductionFailed {
            step,
            reason: e.to_string(),
        };
    }

    tracing::error!(
        step = step.as_str(),
        error = %e,
        record_id = ?leftover_record,
        stock_restored,
        "production left partial writes, reconciliation required"
    );
    AppError::ReconciliationRequired {
        step,
        reason: e.to_string(),
        record_id: leftover_record,
        stock_reserved: !stock_restored,
    }
}
