//! PostgreSQL-backed record store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    CashTransaction, CreateTransactionInput, FinishedGood, FinishedGoodInput, NewProductionRecord,
    ProductType, ProductionRecord, ProductionRecordDetails, RawMaterial, RawMaterialInput,
    RawMaterialSummary, TransactionCategory, TransactionType, Unit,
};

use super::{ProductionCommit, StockAdjustment, Store, StoreError, StoreResult};

/// Record store over a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// Database row for raw material
#[derive(Debug, FromRow)]
struct RawMaterialRow {
    id: Uuid,
    name: String,
    color: String,
    size_category: String,
    unit: String,
    quantity: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RawMaterialRow> for RawMaterial {
    type Error = StoreError;

    fn try_from(row: RawMaterialRow) -> Result<Self, Self::Error> {
        let unit = Unit::from_str(&row.unit).ok_or_else(|| StoreError::CorruptRow {
            table: "raw_materials",
            detail: format!("unknown unit '{}'", row.unit),
        })?;
        Ok(RawMaterial {
            id: row.id,
            name: row.name,
            color: row.color,
            size_category: row.size_category,
            unit,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for production record
#[derive(Debug, FromRow)]
struct ProductionRow {
    id: Uuid,
    raw_material_id: Uuid,
    product_name: String,
    material_used: Decimal,
    output_quantity: i32,
    product_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductionRow> for ProductionRecord {
    type Error = StoreError;

    fn try_from(row: ProductionRow) -> Result<Self, Self::Error> {
        Ok(ProductionRecord {
            id: row.id,
            raw_material_id: row.raw_material_id,
            product_name: row.product_name,
            material_used: row.material_used,
            output_quantity: row.output_quantity,
            product_type: parse_product_type("production_records", &row.product_type)?,
            created_at: row.created_at,
        })
    }
}

/// Production record joined with raw material columns
#[derive(Debug, FromRow)]
struct ProductionDetailsRow {
    #[sqlx(flatten)]
    record: ProductionRow,
    material_name: Option<String>,
    material_color: Option<String>,
    material_unit: Option<String>,
}

impl TryFrom<ProductionDetailsRow> for ProductionRecordDetails {
    type Error = StoreError;

    fn try_from(row: ProductionDetailsRow) -> Result<Self, Self::Error> {
        let raw_material = match (row.material_name, row.material_color, row.material_unit) {
            (Some(name), Some(color), Some(unit)) => Some(RawMaterialSummary {
                name,
                color,
                unit: Unit::from_str(&unit).ok_or_else(|| StoreError::CorruptRow {
                    table: "raw_materials",
                    detail: format!("unknown unit '{}'", unit),
                })?,
            }),
            _ => None,
        };
        Ok(ProductionRecordDetails {
            record: row.record.try_into()?,
            raw_material,
        })
    }
}

/// Database row for finished good
#[derive(Debug, FromRow)]
struct FinishedGoodRow {
    id: Uuid,
    name: String,
    product_type: String,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FinishedGoodRow> for FinishedGood {
    type Error = StoreError;

    fn try_from(row: FinishedGoodRow) -> Result<Self, Self::Error> {
        Ok(FinishedGood {
            id: row.id,
            name: row.name,
            product_type: parse_product_type("finished_goods", &row.product_type)?,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for cash transaction
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    date: NaiveDate,
    description: String,
    category: String,
    kind: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for CashTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let category =
            TransactionCategory::from_str(&row.category).ok_or_else(|| StoreError::CorruptRow {
                table: "transactions",
                detail: format!("unknown category '{}'", row.category),
            })?;
        let kind = TransactionType::from_str(&row.kind).ok_or_else(|| StoreError::CorruptRow {
            table: "transactions",
            detail: format!("unknown type '{}'", row.kind),
        })?;
        Ok(CashTransaction {
            id: row.id,
            date: row.date,
            description: row.description,
            category,
            kind,
            amount: row.amount,
            created_at: row.created_at,
        })
    }
}

fn parse_product_type(table: &'static str, value: &str) -> StoreResult<ProductType> {
    ProductType::from_str(value).ok_or_else(|| StoreError::CorruptRow {
        table,
        detail: format!("unknown product type '{}'", value),
    })
}

/// Translate unique violations so callers can report a duplicate instead of a store failure
fn map_unique(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation(what.to_string());
        }
    }
    e.into()
}

/// Translate numeric overflow (SQLSTATE 22003) into a permanent range error
fn map_range(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("22003") {
            return StoreError::OutOfRange(what.to_string());
        }
    }
    e.into()
}

fn collect<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ============================================================================
// Queries shared by single calls and the production transaction
// ============================================================================

const ADJUST_QUANTITY_SQL: &str = r#"
    UPDATE raw_materials
    SET quantity = quantity + $2, updated_at = NOW()
    WHERE id = $1 AND quantity + $2 >= 0
    RETURNING id, name, color, size_category, unit, quantity, created_at, updated_at
"#;

const INSERT_PRODUCTION_SQL: &str = r#"
    INSERT INTO production_records (raw_material_id, product_name, material_used, output_quantity, product_type)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, raw_material_id, product_name, material_used, output_quantity, product_type, created_at
"#;

const INCREMENT_FINISHED_GOOD_SQL: &str = r#"
    INSERT INTO finished_goods (name, product_type, quantity)
    VALUES ($1, $2, $3)
    ON CONFLICT (name, product_type)
    DO UPDATE SET quantity = finished_goods.quantity + EXCLUDED.quantity, updated_at = NOW()
    RETURNING id, name, product_type, quantity, created_at, updated_at
"#;

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    async fn insert_raw_material(&self, input: &RawMaterialInput) -> StoreResult<RawMaterial> {
        let row = sqlx::query_as::<_, RawMaterialRow>(
            r#"
            INSERT INTO raw_materials (name, color, size_category, unit, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, color, size_category, unit, quantity, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.color)
        .bind(&input.size_category)
        .bind(input.unit.as_str())
        .bind(input.quantity)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn get_raw_material(&self, id: Uuid) -> StoreResult<Option<RawMaterial>> {
        let row = sqlx::query_as::<_, RawMaterialRow>(
            r#"
            SELECT id, name, color, size_category, unit, quantity, created_at, updated_at
            FROM raw_materials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(RawMaterial::try_from).transpose()
    }

    async fn list_raw_materials(&self) -> StoreResult<Vec<RawMaterial>> {
        let rows = sqlx::query_as::<_, RawMaterialRow>(
            r#"
            SELECT id, name, color, size_category, unit, quantity, created_at, updated_at
            FROM raw_materials
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        collect(rows)
    }

    async fn replace_raw_material(
        &self,
        id: Uuid,
        input: &RawMaterialInput,
    ) -> StoreResult<Option<RawMaterial>> {
        let row = sqlx::query_as::<_, RawMaterialRow>(
            r#"
            UPDATE raw_materials
            SET name = $1, color = $2, size_category = $3, unit = $4, quantity = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, color, size_category, unit, quantity, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.color)
        .bind(&input.size_category)
        .bind(input.unit.as_str())
        .bind(input.quantity)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(RawMaterial::try_from).transpose()
    }

    async fn delete_raw_material(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM raw_materials WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn adjust_raw_material_quantity(
        &self,
        id: Uuid,
        delta: Decimal,
    ) -> StoreResult<StockAdjustment> {
        let row = sqlx::query_as::<_, RawMaterialRow>(ADJUST_QUANTITY_SQL)
            .bind(id)
            .bind(delta)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| map_range(e, "raw material quantity"))?;

        if let Some(row) = row {
            return Ok(StockAdjustment::Applied(row.try_into()?));
        }

        // Conditional update matched nothing: either absent or not enough stock
        let available =
            sqlx::query_scalar::<_, Decimal>("SELECT quantity FROM raw_materials WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(match available {
            Some(available) => StockAdjustment::Insufficient { available },
            None => StockAdjustment::Missing,
        })
    }

    async fn insert_production_record(
        &self,
        record: &NewProductionRecord,
    ) -> StoreResult<ProductionRecord> {
        let row = sqlx::query_as::<_, ProductionRow>(INSERT_PRODUCTION_SQL)
            .bind(record.raw_material_id)
            .bind(&record.product_name)
            .bind(record.material_used)
            .bind(record.output_quantity)
            .bind(record.product_type.as_str())
            .fetch_one(&self.db)
            .await?;

        row.try_into()
    }

    async fn delete_production_record(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM production_records WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_production_records(&self) -> StoreResult<Vec<ProductionRecordDetails>> {
        let rows = sqlx::query_as::<_, ProductionDetailsRow>(
            r#"
            SELECT pr.id, pr.raw_material_id, pr.product_name, pr.material_used,
                   pr.output_quantity, pr.product_type, pr.created_at,
                   rm.name AS material_name, rm.color AS material_color, rm.unit AS material_unit
            FROM production_records pr
            LEFT JOIN raw_materials rm ON rm.id = pr.raw_material_id
            ORDER BY pr.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        collect(rows)
    }

    async fn increment_finished_good(
        &self,
        name: &str,
        product_type: ProductType,
        quantity: i32,
    ) -> StoreResult<FinishedGood> {
        let row = sqlx::query_as::<_, FinishedGoodRow>(INCREMENT_FINISHED_GOOD_SQL)
            .bind(name)
            .bind(product_type.as_str())
            .bind(quantity)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_range(e, "finished good quantity"))?;

        row.try_into()
    }

    async fn list_finished_goods(&self) -> StoreResult<Vec<FinishedGood>> {
        let rows = sqlx::query_as::<_, FinishedGoodRow>(
            r#"
            SELECT id, name, product_type, quantity, created_at, updated_at
            FROM finished_goods
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        collect(rows)
    }

    async fn replace_finished_good(
        &self,
        id: Uuid,
        input: &FinishedGoodInput,
    ) -> StoreResult<Option<FinishedGood>> {
        let row = sqlx::query_as::<_, FinishedGoodRow>(
            r#"
            UPDATE finished_goods
            SET name = $1, product_type = $2, quantity = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, product_type, quantity, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.product_type.as_str())
        .bind(input.quantity)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique(e, "finished good name and product type"))?;

        row.map(FinishedGood::try_from).transpose()
    }

    async fn delete_finished_good(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM finished_goods WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_transaction(
        &self,
        input: &CreateTransactionInput,
    ) -> StoreResult<CashTransaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (date, description, category, type, amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, date, description, category, type AS kind, amount, created_at
            "#,
        )
        .bind(input.date)
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(input.kind.as_str())
        .bind(input.amount)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn list_transactions(&self) -> StoreResult<Vec<CashTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, date, description, category, type AS kind, amount, created_at
            FROM transactions
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        collect(rows)
    }

    async fn delete_transaction(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit_production(
        &self,
        record: &NewProductionRecord,
    ) -> StoreResult<ProductionCommit> {
        let mut tx = self.db.begin().await?;

        // Decrement first so the row lock is held for the rest of the unit
        let decremented = sqlx::query_as::<_, RawMaterialRow>(ADJUST_QUANTITY_SQL)
            .bind(record.raw_material_id)
            .bind(-record.material_used)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_range(e, "raw material quantity"))?;

        let raw_material: RawMaterial = match decremented {
            Some(row) => row.try_into()?,
            None => {
                let available = sqlx::query_scalar::<_, Decimal>(
                    "SELECT quantity FROM raw_materials WHERE id = $1",
                )
                .bind(record.raw_material_id)
                .fetch_optional(&mut *tx)
                .await?;
                tx.rollback().await?;

                return Ok(match available {
                    Some(available) => ProductionCommit::Insufficient { available },
                    None => ProductionCommit::MaterialMissing,
                });
            }
        };

        let record_row = sqlx::query_as::<_, ProductionRow>(INSERT_PRODUCTION_SQL)
            .bind(record.raw_material_id)
            .bind(&record.product_name)
            .bind(record.material_used)
            .bind(record.output_quantity)
            .bind(record.product_type.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let finished_row = sqlx::query_as::<_, FinishedGoodRow>(INCREMENT_FINISHED_GOOD_SQL)
            .bind(&record.product_name)
            .bind(record.product_type.as_str())
            .bind(record.output_quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_range(e, "finished good quantity"))?;

        tx.commit().await?;

        Ok(ProductionCommit::Committed {
            record: record_row.try_into()?,
            raw_material,
            finished_good: finished_row.try_into()?,
        })
    }
}
