//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{CreateProductionInput, ProductType, RawMaterialInput, Unit};
use textile_ledger::services::{
    CashLedgerService, DashboardService, FinishedGoodsService, ProductionService, RetryPolicy,
    StockLedgerService,
};
use textile_ledger::store::InMemoryStore;
use textile_ledger::{Invalidations, Store};

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Three attempts, no pause between them
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff: Duration::ZERO,
    }
}

pub fn fabric(name: &str, quantity: &str) -> RawMaterialInput {
    RawMaterialInput {
        name: name.to_string(),
        color: "Navy".to_string(),
        size_category: "Wide".to_string(),
        unit: Unit::Meter,
        quantity: dec(quantity),
    }
}

pub fn production(
    raw_material_id: Uuid,
    material_used: &str,
    output_quantity: i32,
    product_name: &str,
) -> CreateProductionInput {
    CreateProductionInput {
        raw_material_id,
        material_used: dec(material_used),
        output_quantity,
        product_type: ProductType::Pashmina,
        product_name: product_name.to_string(),
        current_material_quantity: None,
    }
}

/// Services wired to one in-memory store
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub invalidations: Invalidations,
    pub stock: StockLedgerService,
    pub goods: FinishedGoodsService,
    pub ledger: CashLedgerService,
    pub production: ProductionService,
    pub dashboard: DashboardService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::new())
    }

    pub fn transactional() -> Self {
        Self::with_store(InMemoryStore::transactional())
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        let dyn_store: Arc<dyn Store> = store.clone();
        let invalidations = Invalidations::new(64);
        Self {
            stock: StockLedgerService::new(dyn_store.clone(), invalidations.clone()),
            goods: FinishedGoodsService::new(dyn_store.clone(), invalidations.clone()),
            ledger: CashLedgerService::new(dyn_store.clone(), invalidations.clone()),
            production: ProductionService::new(
                dyn_store.clone(),
                invalidations.clone(),
                fast_retry(),
            ),
            dashboard: DashboardService::new(dyn_store),
            store,
            invalidations,
        }
    }

    /// Quantity of the finished good row for (name, product_type), zero when absent
    pub async fn on_hand(&self, name: &str, product_type: ProductType) -> i32 {
        self.goods
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|g| g.name == name && g.product_type == product_type)
            .map(|g| g.quantity)
            .unwrap_or(0)
    }

    pub async fn pashmina(&self, name: &str) -> i32 {
        self.on_hand(name, ProductType::Pashmina).await
    }

    pub async fn stock_of(&self, id: Uuid) -> Decimal {
        self.stock.get(id).await.unwrap().quantity
    }
}
