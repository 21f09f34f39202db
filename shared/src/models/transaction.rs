//! Cash ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bookkeeping category of a cash movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionCategory {
    Operational,
    Sales,
    Purchase,
}

impl TransactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Operational => "Operational",
            TransactionCategory::Sales => "Sales",
            TransactionCategory::Purchase => "Purchase",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Operational" => Some(TransactionCategory::Operational),
            "Sales" => Some(TransactionCategory::Sales),
            "Purchase" => Some(TransactionCategory::Purchase),
            _ => None,
        }
    }
}

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    In,
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "In",
            TransactionType::Out => "Out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "In" => Some(TransactionType::In),
            "Out" => Some(TransactionType::Out),
            _ => None,
        }
    }

    /// Amount with the sign this direction applies to the balance
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::In => amount,
            TransactionType::Out => -amount,
        }
    }
}

/// A recorded cash movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashTransaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub category: TransactionCategory,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always positive; direction comes from `kind`
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a cash movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionInput {
    pub date: NaiveDate,
    pub description: String,
    pub category: TransactionCategory,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
}

/// Transaction annotated with the balance after it, in date order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub transaction: CashTransaction,
    pub running_balance: Decimal,
}
