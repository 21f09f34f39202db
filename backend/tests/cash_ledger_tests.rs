//! Cash ledger tests
//!
//! Tests for cash movements including:
//! - Running balance ordering and same-day ties
//! - Append validation
//! - Balance independence from insertion order
//! - Dashboard figures

mod common;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{dec, fabric, Fixture};
use shared::{CreateTransactionInput, TransactionCategory, TransactionType};
use textile_ledger::error::AppError;
use textile_ledger::store::StoreOp;
use textile_ledger::Collection;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn entry(day: &str, kind: TransactionType, amount: &str) -> CreateTransactionInput {
    CreateTransactionInput {
        date: date(day),
        description: format!("{:?} on {}", kind, day),
        category: match kind {
            TransactionType::In => TransactionCategory::Sales,
            TransactionType::Out => TransactionCategory::Purchase,
        },
        kind,
        amount: dec(amount),
    }
}

// ============================================================================
// Running Balance
// ============================================================================

#[tokio::test]
async fn test_running_balance_out_of_order_entries() {
    let fx = Fixture::new();
    fx.ledger
        .append(entry("2024-01-10", TransactionType::In, "50000"))
        .await
        .unwrap();
    fx.ledger
        .append(entry("2024-01-05", TransactionType::Out, "20000"))
        .await
        .unwrap();

    let entries = fx.ledger.list_with_running_balance().await.unwrap();
    assert_eq!(entries.len(), 2);
    // Most recent first
    assert_eq!(entries[0].transaction.date, date("2024-01-10"));
    assert_eq!(entries[0].running_balance, dec("30000"));
    assert_eq!(entries[1].transaction.date, date("2024-01-05"));
    assert_eq!(entries[1].running_balance, dec("-20000"));

    assert_eq!(fx.ledger.balance().await.unwrap(), dec("30000"));
}

#[tokio::test]
async fn test_same_day_entries_fold_in_insertion_order() {
    let fx = Fixture::new();
    let first = fx
        .ledger
        .append(entry("2024-03-01", TransactionType::In, "100"))
        .await
        .unwrap();
    let second = fx
        .ledger
        .append(entry("2024-03-01", TransactionType::Out, "30"))
        .await
        .unwrap();

    let entries = fx.ledger.list_with_running_balance().await.unwrap();
    assert_eq!(entries[0].transaction.id, second.id);
    assert_eq!(entries[0].running_balance, dec("70"));
    assert_eq!(entries[1].transaction.id, first.id);
    assert_eq!(entries[1].running_balance, dec("100"));
}

#[tokio::test]
async fn test_empty_ledger() {
    let fx = Fixture::new();
    assert!(fx.ledger.list_with_running_balance().await.unwrap().is_empty());
    assert_eq!(fx.ledger.balance().await.unwrap(), Decimal::ZERO);
}

// ============================================================================
// Append / Delete
// ============================================================================

#[tokio::test]
async fn test_append_validation() {
    let fx = Fixture::new();

    let zero = entry("2024-01-01", TransactionType::In, "0");
    let negative = entry("2024-01-01", TransactionType::Out, "-10");
    let mut blank = entry("2024-01-01", TransactionType::In, "10");
    blank.description = "   ".to_string();

    for (input, expected_field) in [(zero, "amount"), (negative, "amount"), (blank, "description")] {
        match fx.ledger.append(input).await.unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, expected_field),
            other => panic!("expected Validation, got {:?}", other),
        }
    }
    assert_eq!(fx.ledger.balance().await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_delete_transaction() {
    let fx = Fixture::new();
    let kept = fx
        .ledger
        .append(entry("2024-01-01", TransactionType::In, "500"))
        .await
        .unwrap();
    let removed = fx
        .ledger
        .append(entry("2024-01-02", TransactionType::Out, "200"))
        .await
        .unwrap();
    let mut rx = fx.invalidations.subscribe();

    fx.ledger.delete(removed.id).await.unwrap();
    assert_eq!(rx.try_recv().unwrap(), Collection::Transactions);

    let entries = fx.ledger.list_with_running_balance().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].transaction.id, kept.id);
    assert_eq!(fx.ledger.balance().await.unwrap(), dec("500"));

    assert!(matches!(
        fx.ledger.delete(Uuid::new_v4()).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_store_error() {
    let fx = Fixture::new();
    fx.store.fail_op(StoreOp::ListTransactions, 0, 1).await;

    let err = fx.ledger.balance().await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert_eq!(err.code(), "STORE_ERROR");

    // Failures are not retried outside production runs, the next call succeeds
    assert_eq!(fx.ledger.balance().await.unwrap(), Decimal::ZERO);
}

// ============================================================================
// Cash Flow and Dashboard
// ============================================================================

#[tokio::test]
async fn test_monthly_cash_flow() {
    let fx = Fixture::new();
    for (day, kind, amount) in [
        ("2023-12-20", TransactionType::In, "999"),
        ("2024-01-05", TransactionType::In, "300"),
        ("2024-01-25", TransactionType::Out, "100"),
        ("2024-03-02", TransactionType::Out, "50"),
    ] {
        fx.ledger.append(entry(day, kind, amount)).await.unwrap();
    }

    let series = fx
        .ledger
        .monthly_cash_flow(date("2024-03-15"), 3)
        .await
        .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!((series[0].year, series[0].month), (2024, 1));
    assert_eq!(series[0].income, dec("300"));
    assert_eq!(series[0].expenses, dec("100"));
    assert_eq!(series[1].income, Decimal::ZERO);
    assert_eq!((series[2].year, series[2].month), (2024, 3));
    assert_eq!(series[2].expenses, dec("50"));
}

#[tokio::test]
async fn test_dashboard_summary() {
    let fx = Fixture::new();
    let material = fx.stock.create(fabric("Voile", "100")).await.unwrap();
    fx.stock.create(fabric("Chiffon", "40.5")).await.unwrap();
    fx.production
        .produce(common::production(material.id, "30", 20, "Navy Pashmina"))
        .await
        .unwrap();
    fx.ledger
        .append(entry("2024-05-01", TransactionType::In, "1000"))
        .await
        .unwrap();
    fx.ledger
        .append(entry("2024-05-02", TransactionType::Out, "250"))
        .await
        .unwrap();

    let summary = fx.dashboard.summary(date("2024-05-20")).await.unwrap();

    assert_eq!(summary.cash_balance, dec("750"));
    assert_eq!(summary.total_raw_material, dec("110.5"));
    assert_eq!(summary.total_finished_goods, 20);
    assert_eq!(summary.raw_material_count, 2);
    assert_eq!(summary.finished_good_count, 1);
    assert_eq!(summary.cash_flow.len(), 6);
    let may = summary.cash_flow.last().unwrap();
    assert_eq!((may.year, may.month), (2024, 5));
    assert_eq!(may.income, dec("1000"));
    assert_eq!(may.expenses, dec("250"));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn arb_entry() -> impl Strategy<Value = (u32, bool, u32)> {
    (1u32..=28, prop::bool::ANY, 1u32..=100_000)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The final balance does not depend on the order entries were recorded in
    #[test]
    fn prop_balance_is_order_independent(
        entries in prop::collection::vec(arb_entry(), 1..25),
        seed in any::<u64>()
    ) {
        let mut shuffled = entries.clone();
        // Deterministic permutation
        let n = shuffled.len();
        for i in (1..n).rev() {
            let j = ((seed >> (i % 32)) as usize + i * 7) % (i + 1);
            shuffled.swap(i, j);
        }

        let rt = tokio::runtime::Runtime::new().unwrap();
        let (a, b, running) = rt.block_on(async {
            let mut balances = Vec::new();
            let mut last_running = Decimal::ZERO;
            for list in [&entries, &shuffled] {
                let fx = Fixture::new();
                for (day, is_in, amount) in list {
                    let kind = if *is_in { TransactionType::In } else { TransactionType::Out };
                    let input = entry(&format!("2024-02-{:02}", day), kind, &amount.to_string());
                    fx.ledger.append(input).await.unwrap();
                }
                balances.push(fx.ledger.balance().await.unwrap());
                let listing = fx.ledger.list_with_running_balance().await.unwrap();
                last_running = listing[0].running_balance;
            }
            (balances[0], balances[1], last_running)
        });

        let expected: Decimal = entries
            .iter()
            .map(|(_, is_in, amount)| {
                let amount = Decimal::from(*amount);
                if *is_in { amount } else { -amount }
            })
            .sum();
        prop_assert_eq!(a, expected);
        prop_assert_eq!(b, expected);
        prop_assert_eq!(running, expected);
    }
}
