//! In-process record store
//!
//! Each call holds a single lock for its duration, which gives the same
//! single-record atomicity as the remote store. By default it offers no
//! multi-table transaction, so production runs go through the saga path.
//! Failures can be injected per operation to exercise retries and
//! compensation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::{
    CashTransaction, CreateTransactionInput, FinishedGood, FinishedGoodInput, NewProductionRecord,
    ProductType, ProductionRecord, ProductionRecordDetails, RawMaterial, RawMaterialInput,
    RawMaterialSummary,
};

use shared::validation::MAX_QUANTITY;

use super::{ProductionCommit, StockAdjustment, Store, StoreError, StoreResult};

/// Operations that accept injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertRawMaterial,
    AdjustStock,
    InsertProductionRecord,
    DeleteProductionRecord,
    IncrementFinishedGood,
    InsertTransaction,
    ListTransactions,
}

#[derive(Debug, Clone, Copy)]
struct FaultPlan {
    /// Calls that succeed before failures start
    skip: u32,
    /// Calls that fail once `skip` is exhausted
    remaining: u32,
}

#[derive(Default)]
struct State {
    raw_materials: Vec<RawMaterial>,
    production_records: Vec<ProductionRecord>,
    finished_goods: Vec<FinishedGood>,
    transactions: Vec<CashTransaction>,
    faults: HashMap<StoreOp, FaultPlan>,
}

impl State {
    fn check_fault(&mut self, op: StoreOp) -> StoreResult<()> {
        if let Some(plan) = self.faults.get_mut(&op) {
            if plan.skip > 0 {
                plan.skip -= 1;
            } else if plan.remaining > 0 {
                plan.remaining -= 1;
                return Err(StoreError::Unavailable(format!(
                    "injected failure on {:?}",
                    op
                )));
            }
        }
        Ok(())
    }

    fn adjust(&mut self, id: Uuid, delta: Decimal) -> StoreResult<StockAdjustment> {
        let Some(material) = self.raw_materials.iter_mut().find(|m| m.id == id) else {
            return Ok(StockAdjustment::Missing);
        };
        // Same bound as the NUMERIC(14,3) column
        let next = material
            .quantity
            .checked_add(delta)
            .filter(|next| *next <= MAX_QUANTITY)
            .ok_or_else(|| StoreError::OutOfRange(format!("raw material {} quantity", id)))?;
        if next < Decimal::ZERO {
            return Ok(StockAdjustment::Insufficient {
                available: material.quantity,
            });
        }
        material.quantity = next;
        material.updated_at = Utc::now();
        Ok(StockAdjustment::Applied(material.clone()))
    }

    fn insert_record(&mut self, record: &NewProductionRecord) -> ProductionRecord {
        let row = ProductionRecord {
            id: Uuid::new_v4(),
            raw_material_id: record.raw_material_id,
            product_name: record.product_name.clone(),
            material_used: record.material_used,
            output_quantity: record.output_quantity,
            product_type: record.product_type,
            created_at: Utc::now(),
        };
        self.production_records.push(row.clone());
        row
    }

    /// Quantity the finished good would hold after adding `quantity`
    fn incremented_quantity(
        &self,
        name: &str,
        product_type: ProductType,
        quantity: i32,
    ) -> StoreResult<i32> {
        let current = self
            .finished_goods
            .iter()
            .find(|g| g.name == name && g.product_type == product_type)
            .map_or(0, |g| g.quantity);
        current
            .checked_add(quantity)
            .ok_or_else(|| StoreError::OutOfRange(format!("finished good {} quantity", name)))
    }

    fn increment(
        &mut self,
        name: &str,
        product_type: ProductType,
        quantity: i32,
    ) -> StoreResult<FinishedGood> {
        let next = self.incremented_quantity(name, product_type, quantity)?;
        let now = Utc::now();
        if let Some(existing) = self
            .finished_goods
            .iter_mut()
            .find(|g| g.name == name && g.product_type == product_type)
        {
            existing.quantity = next;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let row = FinishedGood {
            id: Uuid::new_v4(),
            name: name.to_string(),
            product_type,
            quantity,
            created_at: now,
            updated_at: now,
        };
        self.finished_goods.push(row.clone());
        Ok(row)
    }
}

/// Record store kept in process memory
pub struct InMemoryStore {
    state: Mutex<State>,
    transactional: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            transactional: false,
        }
    }

    /// Variant that also offers [`Store::commit_production`]
    pub fn transactional() -> Self {
        Self {
            state: Mutex::new(State::default()),
            transactional: true,
        }
    }

    /// Let `skip` calls of `op` through, then fail the next `times` calls
    pub async fn fail_op(&self, op: StoreOp, skip: u32, times: u32) {
        let mut state = self.state.lock().await;
        state.faults.insert(
            op,
            FaultPlan {
                skip,
                remaining: times,
            },
        );
    }

    /// Remove every injected failure
    pub async fn clear_faults(&self) {
        self.state.lock().await.faults.clear();
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        self.transactional
    }

    async fn insert_raw_material(&self, input: &RawMaterialInput) -> StoreResult<RawMaterial> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::InsertRawMaterial)?;

        let now = Utc::now();
        let material = RawMaterial {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            color: input.color.clone(),
            size_category: input.size_category.clone(),
            unit: input.unit,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        };
        state.raw_materials.push(material.clone());
        Ok(material)
    }

    async fn get_raw_material(&self, id: Uuid) -> StoreResult<Option<RawMaterial>> {
        let state = self.state.lock().await;
        Ok(state.raw_materials.iter().find(|m| m.id == id).cloned())
    }

    async fn list_raw_materials(&self) -> StoreResult<Vec<RawMaterial>> {
        let state = self.state.lock().await;
        Ok(state.raw_materials.iter().rev().cloned().collect())
    }

    async fn replace_raw_material(
        &self,
        id: Uuid,
        input: &RawMaterialInput,
    ) -> StoreResult<Option<RawMaterial>> {
        let mut state = self.state.lock().await;
        let Some(material) = state.raw_materials.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        material.name = input.name.clone();
        material.color = input.color.clone();
        material.size_category = input.size_category.clone();
        material.unit = input.unit;
        material.quantity = input.quantity;
        material.updated_at = Utc::now();
        Ok(Some(material.clone()))
    }

    async fn delete_raw_material(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.raw_materials.len();
        state.raw_materials.retain(|m| m.id != id);
        Ok(state.raw_materials.len() < before)
    }

    async fn adjust_raw_material_quantity(
        &self,
        id: Uuid,
        delta: Decimal,
    ) -> StoreResult<StockAdjustment> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::AdjustStock)?;
        state.adjust(id, delta)
    }

    async fn insert_production_record(
        &self,
        record: &NewProductionRecord,
    ) -> StoreResult<ProductionRecord> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::InsertProductionRecord)?;
        Ok(state.insert_record(record))
    }

    async fn delete_production_record(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::DeleteProductionRecord)?;
        let before = state.production_records.len();
        state.production_records.retain(|r| r.id != id);
        Ok(state.production_records.len() < before)
    }

    async fn list_production_records(&self) -> StoreResult<Vec<ProductionRecordDetails>> {
        let state = self.state.lock().await;
        Ok(state
            .production_records
            .iter()
            .rev()
            .map(|record| ProductionRecordDetails {
                record: record.clone(),
                raw_material: state
                    .raw_materials
                    .iter()
                    .find(|m| m.id == record.raw_material_id)
                    .map(|m| RawMaterialSummary {
                        name: m.name.clone(),
                        color: m.color.clone(),
                        unit: m.unit,
                    }),
            })
            .collect())
    }

    async fn increment_finished_good(
        &self,
        name: &str,
        product_type: ProductType,
        quantity: i32,
    ) -> StoreResult<FinishedGood> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::IncrementFinishedGood)?;
        state.increment(name, product_type, quantity)
    }

    async fn list_finished_goods(&self) -> StoreResult<Vec<FinishedGood>> {
        let state = self.state.lock().await;
        Ok(state.finished_goods.iter().rev().cloned().collect())
    }

    async fn replace_finished_good(
        &self,
        id: Uuid,
        input: &FinishedGoodInput,
    ) -> StoreResult<Option<FinishedGood>> {
        let mut state = self.state.lock().await;
        let collides = state
            .finished_goods
            .iter()
            .any(|g| g.id != id && g.name == input.name && g.product_type == input.product_type);
        let Some(good) = state.finished_goods.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        if collides {
            return Err(StoreError::UniqueViolation(
                "finished good name and product type".to_string(),
            ));
        }
        good.name = input.name.clone();
        good.product_type = input.product_type;
        good.quantity = input.quantity;
        good.updated_at = Utc::now();
        Ok(Some(good.clone()))
    }

    async fn delete_finished_good(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.finished_goods.len();
        state.finished_goods.retain(|g| g.id != id);
        Ok(state.finished_goods.len() < before)
    }

    async fn insert_transaction(
        &self,
        input: &CreateTransactionInput,
    ) -> StoreResult<CashTransaction> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::InsertTransaction)?;

        let transaction = CashTransaction {
            id: Uuid::new_v4(),
            date: input.date,
            description: input.description.clone(),
            category: input.category,
            kind: input.kind,
            amount: input.amount,
            created_at: Utc::now(),
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn list_transactions(&self) -> StoreResult<Vec<CashTransaction>> {
        let mut state = self.state.lock().await;
        state.check_fault(StoreOp::ListTransactions)?;
        Ok(state.transactions.clone())
    }

    async fn delete_transaction(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.transactions.len();
        state.transactions.retain(|t| t.id != id);
        Ok(state.transactions.len() < before)
    }

    async fn commit_production(
        &self,
        record: &NewProductionRecord,
    ) -> StoreResult<ProductionCommit> {
        if !self.transactional {
            return Err(StoreError::Unsupported("multi-table transactions"));
        }

        let mut state = self.state.lock().await;
        // Any injected failure aborts before the first write, like a rolled back transaction
        state.check_fault(StoreOp::AdjustStock)?;
        state.check_fault(StoreOp::InsertProductionRecord)?;
        state.check_fault(StoreOp::IncrementFinishedGood)?;
        // Checked up front so an overflow cannot leave the first two writes behind
        state.incremented_quantity(
            &record.product_name,
            record.product_type,
            record.output_quantity,
        )?;

        let raw_material = match state.adjust(record.raw_material_id, -record.material_used)? {
            StockAdjustment::Applied(material) => material,
            StockAdjustment::Insufficient { available } => {
                return Ok(ProductionCommit::Insufficient { available })
            }
            StockAdjustment::Missing => return Ok(ProductionCommit::MaterialMissing),
        };
        let inserted = state.insert_record(record);
        let finished_good = state.increment(
            &record.product_name,
            record.product_type,
            record.output_quantity,
        )?;

        Ok(ProductionCommit::Committed {
            record: inserted,
            raw_material,
            finished_good,
        })
    }
}
