//! Finished goods aggregator tests
//!
//! Tests for the per-product totals including:
//! - Insert-or-increment keyed by name and product type
//! - Manual edits and key collisions
//! - Concurrent upserts

mod common;

use std::sync::Arc;

use uuid::Uuid;

use common::Fixture;
use shared::{FinishedGoodInput, ProductType, UpsertFinishedGoodInput};
use textile_ledger::error::AppError;

fn upsert(name: &str, product_type: ProductType, quantity_to_add: i32) -> UpsertFinishedGoodInput {
    UpsertFinishedGoodInput {
        name: name.to_string(),
        product_type,
        quantity_to_add,
    }
}

#[tokio::test]
async fn test_upsert_creates_then_accumulates() {
    let fx = Fixture::new();

    let created = fx
        .goods
        .upsert(upsert("Navy Pashmina", ProductType::Pashmina, 20))
        .await
        .unwrap();
    assert_eq!(created.quantity, 20);

    let accumulated = fx
        .goods
        .upsert(upsert("Navy Pashmina", ProductType::Pashmina, 15))
        .await
        .unwrap();
    assert_eq!(accumulated.id, created.id);
    assert_eq!(accumulated.quantity, 35);

    let goods = fx.goods.list().await.unwrap();
    assert_eq!(goods.len(), 1);
    assert_eq!(goods[0].quantity, 35);
}

#[tokio::test]
async fn test_upsert_past_integer_range_is_rejected() {
    let fx = Fixture::new();
    fx.goods
        .upsert(upsert("Navy Pashmina", ProductType::Pashmina, i32::MAX))
        .await
        .unwrap();

    let err = fx
        .goods
        .upsert(upsert("Navy Pashmina", ProductType::Pashmina, 1))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(fx.pashmina("Navy Pashmina").await, i32::MAX);
}

#[tokio::test]
async fn test_product_type_is_part_of_the_key() {
    let fx = Fixture::new();

    fx.goods
        .upsert(upsert("Plain", ProductType::Pashmina, 5))
        .await
        .unwrap();
    fx.goods
        .upsert(upsert("Plain", ProductType::Kerudung, 7))
        .await
        .unwrap();
    fx.goods
        .upsert(upsert(" Plain ", ProductType::Kerudung, 1))
        .await
        .unwrap();

    let goods = fx.goods.list().await.unwrap();
    assert_eq!(goods.len(), 2);
    let summary = fx
        .dashboard
        .summary(chrono::Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(summary.total_finished_goods, 13);
    // Newest first
    assert_eq!(goods[0].product_type, ProductType::Kerudung);
    assert_eq!(goods[0].quantity, 8);
}

#[tokio::test]
async fn test_upsert_requires_positive_increment() {
    let fx = Fixture::new();
    for quantity in [0, -3] {
        let err = fx
            .goods
            .upsert(upsert("Plain", ProductType::Pashmina, quantity))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity_to_add"));
    }
    assert!(fx.goods.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_update() {
    let fx = Fixture::new();
    let good = fx
        .goods
        .upsert(upsert("Plain", ProductType::Pashmina, 5))
        .await
        .unwrap();

    let updated = fx
        .goods
        .update(
            good.id,
            FinishedGoodInput {
                name: "Plain Navy".to_string(),
                product_type: ProductType::Pashmina,
                quantity: 0,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, good.id);
    assert_eq!(updated.name, "Plain Navy");
    assert_eq!(updated.quantity, 0);
}

#[tokio::test]
async fn test_manual_update_rejections() {
    let fx = Fixture::new();
    let plain = fx
        .goods
        .upsert(upsert("Plain", ProductType::Pashmina, 5))
        .await
        .unwrap();
    fx.goods
        .upsert(upsert("Striped", ProductType::Pashmina, 5))
        .await
        .unwrap();

    let negative = FinishedGoodInput {
        name: "Plain".to_string(),
        product_type: ProductType::Pashmina,
        quantity: -1,
    };
    assert!(matches!(
        fx.goods.update(plain.id, negative).await.unwrap_err(),
        AppError::Validation { .. }
    ));

    let collision = FinishedGoodInput {
        name: "Striped".to_string(),
        product_type: ProductType::Pashmina,
        quantity: 5,
    };
    let err = fx.goods.update(plain.id, collision.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateEntry(_)));
    assert_eq!(err.code(), "DUPLICATE_ENTRY");

    assert!(matches!(
        fx.goods.update(Uuid::new_v4(), collision).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_delete() {
    let fx = Fixture::new();
    let good = fx
        .goods
        .upsert(upsert("Plain", ProductType::Pashmina, 5))
        .await
        .unwrap();

    fx.goods.delete(good.id).await.unwrap();
    assert!(fx.goods.list().await.unwrap().is_empty());
    assert!(matches!(
        fx.goods.delete(good.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_never_lose_increments() {
    let fx = Arc::new(Fixture::new());

    let handles: Vec<_> = (1..=50)
        .map(|i| {
            let fx = fx.clone();
            tokio::spawn(async move {
                fx.goods
                    .upsert(upsert("Navy Pashmina", ProductType::Pashmina, i))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let goods = fx.goods.list().await.unwrap();
    assert_eq!(goods.len(), 1);
    assert_eq!(goods[0].quantity, (1..=50).sum::<i32>());
}
