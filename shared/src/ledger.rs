//! Cash ledger calculations
//!
//! Balances are always folded in chronological order. Transactions are
//! expected in insertion order; entries sharing a date keep that order.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{CashTransaction, LedgerEntry, MonthlyCashFlow, TransactionType};

/// Number of months shown on the dashboard cash-flow series
pub const DEFAULT_CASH_FLOW_MONTHS: u32 = 6;

/// Attach the running balance to every transaction.
///
/// The fold runs oldest to newest; the result is returned most recent first.
pub fn compute_running_balance(transactions: Vec<CashTransaction>) -> Vec<LedgerEntry> {
    let mut sorted = transactions;
    // Stable: same-day entries stay in insertion order
    sorted.sort_by_key(|t| t.date);

    let mut running = Decimal::ZERO;
    let mut entries: Vec<LedgerEntry> = sorted
        .into_iter()
        .map(|transaction| {
            running = running.saturating_add(transaction.kind.signed(transaction.amount));
            LedgerEntry {
                transaction,
                running_balance: running,
            }
        })
        .collect();

    entries.reverse();
    entries
}

/// Sum of inflows minus sum of outflows, clamped to the `Decimal` range
pub fn cash_balance(transactions: &[CashTransaction]) -> Decimal {
    transactions
        .iter()
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.kind.signed(t.amount)))
}

/// Income and expenses per month for the `months` months ending with `today`'s month,
/// oldest first. Transactions outside the window are ignored.
pub fn monthly_cash_flow(
    transactions: &[CashTransaction],
    today: NaiveDate,
    months: u32,
) -> Vec<MonthlyCashFlow> {
    let current = month_index(today.year(), today.month());

    let mut series: Vec<MonthlyCashFlow> = (0..months as i64)
        .rev()
        .map(|back| {
            let (year, month) = from_month_index(current - back);
            MonthlyCashFlow {
                year,
                month,
                income: Decimal::ZERO,
                expenses: Decimal::ZERO,
            }
        })
        .collect();

    let first = current - months as i64 + 1;
    for t in transactions {
        let idx = month_index(t.date.year(), t.date.month());
        if idx < first || idx > current {
            continue;
        }
        let bucket = &mut series[(idx - first) as usize];
        match t.kind {
            TransactionType::In => bucket.income = bucket.income.saturating_add(t.amount),
            TransactionType::Out => bucket.expenses = bucket.expenses.saturating_add(t.amount),
        }
    }

    series
}

fn month_index(year: i32, month: u32) -> i64 {
    year as i64 * 12 + (month as i64 - 1)
}

fn from_month_index(idx: i64) -> (i32, u32) {
    (idx.div_euclid(12) as i32, (idx.rem_euclid(12) + 1) as u32)
}
