//! Record store boundary
//!
//! Services never talk to a database directly. They go through [`Store`],
//! which models a remote record store offering single-record writes,
//! filtered/ordered reads, and two atomic primitives: a conditional stock
//! adjustment and an increment-or-insert for finished goods. Cross-table
//! atomicity is only available when [`Store::supports_transactions`] says so.

mod memory;
mod postgres;

pub use memory::{InMemoryStore, StoreOp};
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use shared::{
    CashTransaction, CreateTransactionInput, FinishedGood, FinishedGoodInput, NewProductionRecord,
    ProductType, ProductionRecord, ProductionRecordDetails, RawMaterial, RawMaterialInput,
};

/// Failures raised by a store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Raised before the call reached the data, so nothing was written
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt row in {table}: {detail}")]
    CorruptRow { table: &'static str, detail: String },

    #[error("Operation not supported by this store: {0}")]
    Unsupported(&'static str),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

/// SQLSTATEs for a statement the server rolled back before applying
/// (serialization failure, deadlock)
fn is_retryable_sqlstate(code: &str) -> bool {
    matches!(code, "40001" | "40P01")
}

impl StoreError {
    /// Whether repeating the same call may succeed without applying it twice.
    ///
    /// Only failures known to precede any write qualify: waiting for a pool
    /// connection, and statements the server aborted. A dropped connection
    /// may have lost the reply to a committed write, so it is not retried.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            StoreError::Database(sqlx::Error::Database(db)) => db
                .code()
                .map(|code| is_retryable_sqlstate(&code))
                .unwrap_or(false),
            StoreError::Database(_) => false,
            StoreError::Unavailable(_) => true,
            StoreError::UniqueViolation(_)
            | StoreError::CorruptRow { .. }
            | StoreError::Unsupported(_)
            | StoreError::OutOfRange(_) => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a conditional quantity adjustment
#[derive(Debug, Clone, PartialEq)]
pub enum StockAdjustment {
    /// The new quantity was written
    Applied(RawMaterial),
    /// The result would have been negative; nothing was written
    Insufficient { available: Decimal },
    /// No raw material with that id
    Missing,
}

/// Outcome of an atomic production commit
#[derive(Debug, Clone, PartialEq)]
pub enum ProductionCommit {
    Committed {
        record: ProductionRecord,
        raw_material: RawMaterial,
        finished_good: FinishedGood,
    },
    Insufficient {
        available: Decimal,
    },
    MaterialMissing,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;

    /// Whether [`Store::commit_production`] is available
    fn supports_transactions(&self) -> bool {
        false
    }

    // Raw materials
    async fn insert_raw_material(&self, input: &RawMaterialInput) -> StoreResult<RawMaterial>;
    async fn get_raw_material(&self, id: Uuid) -> StoreResult<Option<RawMaterial>>;
    /// Newest first
    async fn list_raw_materials(&self) -> StoreResult<Vec<RawMaterial>>;
    async fn replace_raw_material(
        &self,
        id: Uuid,
        input: &RawMaterialInput,
    ) -> StoreResult<Option<RawMaterial>>;
    async fn delete_raw_material(&self, id: Uuid) -> StoreResult<bool>;
    /// Add `delta` to the quantity only if the result stays non-negative
    async fn adjust_raw_material_quantity(
        &self,
        id: Uuid,
        delta: Decimal,
    ) -> StoreResult<StockAdjustment>;

    // Production records
    async fn insert_production_record(
        &self,
        record: &NewProductionRecord,
    ) -> StoreResult<ProductionRecord>;
    async fn delete_production_record(&self, id: Uuid) -> StoreResult<bool>;
    /// Newest first, joined with the raw material when it still exists
    async fn list_production_records(&self) -> StoreResult<Vec<ProductionRecordDetails>>;

    // Finished goods
    /// Insert a row with `quantity`, or add `quantity` to the existing row for the key
    async fn increment_finished_good(
        &self,
        name: &str,
        product_type: ProductType,
        quantity: i32,
    ) -> StoreResult<FinishedGood>;
    /// Newest first
    async fn list_finished_goods(&self) -> StoreResult<Vec<FinishedGood>>;
    async fn replace_finished_good(
        &self,
        id: Uuid,
        input: &FinishedGoodInput,
    ) -> StoreResult<Option<FinishedGood>>;
    async fn delete_finished_good(&self, id: Uuid) -> StoreResult<bool>;

    // Cash transactions
    async fn insert_transaction(&self, input: &CreateTransactionInput)
        -> StoreResult<CashTransaction>;
    /// Insertion order
    async fn list_transactions(&self) -> StoreResult<Vec<CashTransaction>>;
    async fn delete_transaction(&self, id: Uuid) -> StoreResult<bool>;

    /// Record, decrement and accumulate as one transaction
    async fn commit_production(
        &self,
        _record: &NewProductionRecord,
    ) -> StoreResult<ProductionCommit> {
        Err(StoreError::Unsupported("multi-table transactions"))
    }
}
