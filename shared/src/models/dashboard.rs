//! Dashboard summary models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income and expenses booked in one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyCashFlow {
    pub year: i32,
    /// 1-based calendar month
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// Headline figures for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub cash_balance: Decimal,
    /// Sum of raw material quantities regardless of unit
    pub total_raw_material: Decimal,
    pub total_finished_goods: i64,
    pub raw_material_count: usize,
    pub finished_good_count: usize,
    pub cash_flow: Vec<MonthlyCashFlow>,
}
