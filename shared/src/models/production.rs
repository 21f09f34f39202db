//! Production models: conversion of raw material into finished goods

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Unit;

/// Kinds of finished product the workshop makes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProductType {
    Pashmina,
    Kerudung,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Pashmina => "Pashmina",
            ProductType::Kerudung => "Kerudung",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pashmina" => Some(ProductType::Pashmina),
            "Kerudung" => Some(ProductType::Kerudung),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable log entry of one production run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionRecord {
    pub id: Uuid,
    pub raw_material_id: Uuid,
    /// Finished good the output was credited to
    pub product_name: String,
    pub material_used: Decimal,
    pub output_quantity: i32,
    pub product_type: ProductType,
    pub created_at: DateTime<Utc>,
}

/// Production record as written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductionRecord {
    pub raw_material_id: Uuid,
    pub product_name: String,
    pub material_used: Decimal,
    pub output_quantity: i32,
    pub product_type: ProductType,
}

/// Request to convert raw material into finished goods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductionInput {
    pub raw_material_id: Uuid,
    pub material_used: Decimal,
    pub output_quantity: i32,
    pub product_type: ProductType,
    pub product_name: String,
    /// Quantity the caller saw when building the request; checked before any write
    #[serde(default)]
    pub current_material_quantity: Option<Decimal>,
}

impl CreateProductionInput {
    pub fn to_record(&self) -> NewProductionRecord {
        NewProductionRecord {
            raw_material_id: self.raw_material_id,
            product_name: self.product_name.trim().to_string(),
            material_used: self.material_used,
            output_quantity: self.output_quantity,
            product_type: self.product_type,
        }
    }
}

/// Display fields of the raw material a record consumed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMaterialSummary {
    pub name: String,
    pub color: String,
    pub unit: Unit,
}

/// Production record joined with its raw material, if it still exists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionRecordDetails {
    #[serde(flatten)]
    pub record: ProductionRecord,
    pub raw_material: Option<RawMaterialSummary>,
}
