//! Raw material (fabric) stock models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Physical unit a fabric roll is measured in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Unit {
    Meter,
    Yard,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Meter => "Meter",
            Unit::Yard => "Yard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Meter" => Some(Unit::Meter),
            "Yard" => Some(Unit::Yard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock of one raw material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMaterial {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    /// Free-form size label (e.g., "Standard", "Large")
    pub size_category: String,
    pub unit: Unit,
    /// Never negative
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating or fully replacing a raw material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialInput {
    pub name: String,
    pub color: String,
    pub size_category: String,
    pub unit: Unit,
    pub quantity: Decimal,
}

impl RawMaterialInput {
    /// Copy with surrounding whitespace removed from the text fields
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            color: self.color.trim().to_string(),
            size_category: self.size_category.trim().to_string(),
            unit: self.unit,
            quantity: self.quantity,
        }
    }
}

/// Signed change applied to a raw material's quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustQuantityInput {
    pub delta: Decimal,
}
