//! Dashboard summary

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use shared::ledger::{cash_balance, monthly_cash_flow, DEFAULT_CASH_FLOW_MONTHS};
use shared::DashboardSummary;

use crate::error::AppResult;
use crate::store::Store;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Headline figures as of `today`
    pub async fn summary(&self, today: NaiveDate) -> AppResult<DashboardSummary> {
        let materials = self.store.list_raw_materials().await?;
        let goods = self.store.list_finished_goods().await?;
        let transactions = self.store.list_transactions().await?;

        Ok(DashboardSummary {
            cash_balance: cash_balance(&transactions),
            total_raw_material: materials.iter().map(|m| m.quantity).sum::<Decimal>(),
            total_finished_goods: goods.iter().map(|g| i64::from(g.quantity)).sum(),
            raw_material_count: materials.len(),
            finished_good_count: goods.len(),
            cash_flow: monthly_cash_flow(&transactions, today, DEFAULT_CASH_FLOW_MONTHS),
        })
    }
}
