//! Finished goods stock models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProductType;

/// Aggregated stock of one named product; unique per (name, product_type)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinishedGood {
    pub id: Uuid,
    pub name: String,
    pub product_type: ProductType,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Manual replacement of a finished good row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedGoodInput {
    pub name: String,
    pub product_type: ProductType,
    pub quantity: i32,
}

/// Insert-or-increment request keyed by (name, product_type)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertFinishedGoodInput {
    pub name: String,
    pub product_type: ProductType,
    pub quantity_to_add: i32,
}
