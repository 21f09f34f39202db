//! Cash ledger and balance calculation

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::ledger::{cash_balance, compute_running_balance, monthly_cash_flow};
use shared::validation::validate_transaction;
use shared::{CashTransaction, CreateTransactionInput, LedgerEntry, MonthlyCashFlow};

use crate::error::{AppError, AppResult};
use crate::invalidation::{Collection, Invalidations};
use crate::store::Store;

#[derive(Clone)]
pub struct CashLedgerService {
    store: Arc<dyn Store>,
    invalidations: Invalidations,
}

impl CashLedgerService {
    pub fn new(store: Arc<dyn Store>, invalidations: Invalidations) -> Self {
        Self {
            store,
            invalidations,
        }
    }

    /// Record a cash movement
    pub async fn append(&self, input: CreateTransactionInput) -> AppResult<CashTransaction> {
        let input = CreateTransactionInput {
            description: input.description.trim().to_string(),
            ..input
        };
        validate_transaction(&input)?;

        let transaction = self.store.insert_transaction(&input).await?;
        tracing::info!(
            id = %transaction.id,
            date = %transaction.date,
            kind = transaction.kind.as_str(),
            amount = %transaction.amount,
            "cash transaction recorded"
        );

        self.invalidations.notify(&[Collection::Transactions]);
        Ok(transaction)
    }

    /// Every transaction with its running balance, most recent first
    pub async fn list_with_running_balance(&self) -> AppResult<Vec<LedgerEntry>> {
        let transactions = self.store.list_transactions().await?;
        Ok(compute_running_balance(transactions))
    }

    /// Cumulative balance over all transactions
    pub async fn balance(&self) -> AppResult<Decimal> {
        let transactions = self.store.list_transactions().await?;
        Ok(cash_balance(&transactions))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_transaction(id).await? {
            return Err(AppError::NotFound("Transaction".to_string()));
        }
        tracing::info!(id = %id, "cash transaction deleted");

        self.invalidations.notify(&[Collection::Transactions]);
        Ok(())
    }

    /// Income and expenses for the trailing `months` months ending with `today`'s month
    pub async fn monthly_cash_flow(
        &self,
        today: NaiveDate,
        months: u32,
    ) -> AppResult<Vec<MonthlyCashFlow>> {
        let transactions = self.store.list_transactions().await?;
        Ok(monthly_cash_flow(&transactions, today, months))
    }
}
