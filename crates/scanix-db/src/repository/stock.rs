//! # Stock Ledger
//!
//! Per (product, warehouse) quantity counters. Every sale and transfer
//! exists to move these rows while maintaining the one invariant that
//! matters: **quantity never goes below zero**.
//!
//! ## Check-Then-Act Without a Gap
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read, compare in Rust, then write                        │
//! │     q = SELECT quantity ...          (another sale commits here!)   │
//! │     if q >= amount { UPDATE stock SET quantity = q - amount }       │
//! │     Two concurrent sales both pass the check → oversell.            │
//! │                                                                     │
//! │  ✅ CORRECT: guard the write itself                                 │
//! │     UPDATE stock SET quantity = quantity - ?amount                  │
//! │     WHERE product_id = ? AND warehouse_id = ? AND quantity >= ?     │
//! │     Zero rows affected ⇒ insufficient ⇒ abort the transaction.      │
//! │                                                                     │
//! │  The check and the decrement are one statement under the            │
//! │  transaction's write lock; interleaving is impossible.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `tx_*` functions run inside the caller's transaction (sale,
//! transfer, adjustment); the schema's `CHECK (quantity >= 0)` is the
//! backstop behind them.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use scanix_core::validation::{validate_adjustment_change, validate_id};
use scanix_core::{CoreError, StockAdjustment, StockLevel};

const STOCK_COLUMNS: &str = "id, product_id, warehouse_id, quantity, created_at, updated_at";

// =============================================================================
// Transaction-Scoped Operations
// =============================================================================

/// Reads the current quantity inside the caller's transaction.
/// Absence of a row means zero, not an error.
pub async fn tx_quantity(
    conn: &mut SqliteConnection,
    product_id: &str,
    warehouse_id: &str,
) -> DbResult<i64> {
    let quantity: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM stock WHERE product_id = ?1 AND warehouse_id = ?2",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quantity.unwrap_or(0))
}

/// Atomically checks sufficiency and decrements, in one guarded UPDATE.
///
/// Fails closed with the per-line shortage detail when the row is absent
/// or holds less than `amount`; never clamps to zero. `label` is the
/// product name used in the error message.
pub async fn tx_reserve_and_decrement(
    conn: &mut SqliteConnection,
    product_id: &str,
    warehouse_id: &str,
    amount: i64,
    label: &str,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE stock
        SET quantity = quantity - ?3, updated_at = ?4
        WHERE product_id = ?1 AND warehouse_id = ?2 AND quantity >= ?3
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(amount)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Re-read for the error detail; still inside the transaction, so
        // the value is consistent with the failed guard.
        let available = tx_quantity(conn, product_id, warehouse_id).await?;
        return Err(CoreError::shortage(label, available, amount).into());
    }

    Ok(())
}

/// Adds `amount` to a stock row, creating it when absent.
pub async fn tx_deposit(
    conn: &mut SqliteConnection,
    product_id: &str,
    warehouse_id: &str,
    amount: i64,
) -> DbResult<()> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO stock (id, product_id, warehouse_id, quantity, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT (product_id, warehouse_id)
        DO UPDATE SET quantity = quantity + excluded.quantity, updated_at = excluded.updated_at
        "#,
    )
    .bind(id)
    .bind(product_id)
    .bind(warehouse_id)
    .bind(amount)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Reader Row Shapes
// =============================================================================

/// One line of a warehouse's inventory view.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct WarehouseStockItem {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
}

/// Where a product is held, and how much of it.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ProductStockLocation {
    pub warehouse_id: String,
    pub name: String,
    pub quantity: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock ledger operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Current quantity for one (product, warehouse) pair; 0 when no row.
    pub async fn get_quantity(&self, product_id: &str, warehouse_id: &str) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock WHERE product_id = ?1 AND warehouse_id = ?2",
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// The full stock row for one (product, warehouse) pair, if any.
    pub async fn level(&self, product_id: &str, warehouse_id: &str) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock WHERE product_id = ?1 AND warehouse_id = ?2"
        ))
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Everything a warehouse holds, joined with product name and SKU.
    /// Empty when the warehouse is unknown or empty (read paths don't
    /// error on "nothing found").
    pub async fn by_warehouse(&self, warehouse_id: &str) -> DbResult<Vec<WarehouseStockItem>> {
        let items = sqlx::query_as::<_, WarehouseStockItem>(
            r#"
            SELECT p.id AS product_id, p.name, p.sku, s.quantity
            FROM stock s
            JOIN products p ON p.id = s.product_id
            WHERE s.warehouse_id = ?1
            ORDER BY p.name
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Every location holding a product, joined with warehouse name.
    pub async fn by_product(&self, product_id: &str) -> DbResult<Vec<ProductStockLocation>> {
        let locations = sqlx::query_as::<_, ProductStockLocation>(
            r#"
            SELECT w.id AS warehouse_id, w.name, s.quantity
            FROM stock s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE s.product_id = ?1
            ORDER BY w.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Applies a signed stock correction in its own transaction.
    ///
    /// ## Rules
    /// - Product and warehouse must exist (`NotFound` otherwise)
    /// - Zero change is rejected upstream as a validation error
    /// - A negative change short of stock fails with the shortage detail;
    ///   it never clamps and never creates a row
    pub async fn adjust(&self, adjustment: StockAdjustment) -> DbResult<StockLevel> {
        validate_id("product_id", &adjustment.product_id)?;
        validate_id("warehouse_id", &adjustment.warehouse_id)?;
        validate_adjustment_change(adjustment.change)?;

        debug!(
            product_id = %adjustment.product_id,
            warehouse_id = %adjustment.warehouse_id,
            change = adjustment.change,
            "Adjusting stock"
        );

        let mut tx = self.pool.begin().await?;

        let product_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM products WHERE id = ?1")
                .bind(&adjustment.product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let product_name = product_name
            .ok_or_else(|| DbError::not_found("Product", &adjustment.product_id))?;

        let warehouse_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM warehouses WHERE id = ?1")
                .bind(&adjustment.warehouse_id)
                .fetch_optional(&mut *tx)
                .await?;
        if warehouse_exists.is_none() {
            return Err(DbError::not_found("Warehouse", &adjustment.warehouse_id));
        }

        if adjustment.change > 0 {
            tx_deposit(
                &mut tx,
                &adjustment.product_id,
                &adjustment.warehouse_id,
                adjustment.change,
            )
            .await?;
        } else {
            tx_reserve_and_decrement(
                &mut tx,
                &adjustment.product_id,
                &adjustment.warehouse_id,
                -adjustment.change,
                &product_name,
            )
            .await?;
        }

        let level = sqlx::query_as::<_, StockLevel>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock WHERE product_id = ?1 AND warehouse_id = ?2"
        ))
        .bind(&adjustment.product_id)
        .bind(&adjustment.warehouse_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(level)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{seed_product, seed_warehouse, add_stock, test_db};
    use scanix_core::ValidationError;

    #[tokio::test]
    async fn test_absent_row_reads_as_zero() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let warehouse = seed_warehouse(&db, "Central").await;

        let quantity = db
            .stock()
            .get_quantity(&product.id, &warehouse.id)
            .await
            .unwrap();
        assert_eq!(quantity, 0);
        assert!(db
            .stock()
            .level(&product.id, &warehouse.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_adjust_creates_then_accumulates() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let warehouse = seed_warehouse(&db, "Central").await;

        add_stock(&db, &product.id, &warehouse.id, 10).await;
        add_stock(&db, &product.id, &warehouse.id, 5).await;

        assert_eq!(
            db.stock()
                .get_quantity(&product.id, &warehouse.id)
                .await
                .unwrap(),
            15
        );
    }

    #[tokio::test]
    async fn test_adjust_rejects_zero_change() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let warehouse = seed_warehouse(&db, "Central").await;

        let err = db
            .stock()
            .adjust(StockAdjustment {
                product_id: product.id.clone(),
                warehouse_id: warehouse.id.clone(),
                change: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[tokio::test]
    async fn test_adjust_rejects_unknown_parents() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let warehouse = seed_warehouse(&db, "Central").await;

        let err = db
            .stock()
            .adjust(StockAdjustment {
                product_id: "missing".to_string(),
                warehouse_id: warehouse.id.clone(),
                change: 5,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db
            .stock()
            .adjust(StockAdjustment {
                product_id: product.id.clone(),
                warehouse_id: "missing".to_string(),
                change: 5,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_adjust_never_creates_or_clamps() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let warehouse = seed_warehouse(&db, "Central").await;

        // No row yet: an outflow has nothing to take from.
        let err = db
            .stock()
            .adjust(StockAdjustment {
                product_id: product.id.clone(),
                warehouse_id: warehouse.id.clone(),
                change: -3,
            })
            .await
            .unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock(shortages)) => {
                assert_eq!(shortages[0].available, 0);
                assert_eq!(shortages[0].requested, 3);
            }
            other => panic!("expected shortage, got {other:?}"),
        }
        assert!(db
            .stock()
            .level(&product.id, &warehouse.id)
            .await
            .unwrap()
            .is_none());

        // With stock, going below zero is refused and nothing changes.
        add_stock(&db, &product.id, &warehouse.id, 5).await;
        let err = db
            .stock()
            .adjust(StockAdjustment {
                product_id: product.id.clone(),
                warehouse_id: warehouse.id.clone(),
                change: -6,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock(_))));
        assert_eq!(
            db.stock()
                .get_quantity(&product.id, &warehouse.id)
                .await
                .unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_drain_to_zero_then_fail_with_detail() {
        // Stock(P1,W1)=5: taking 5 succeeds leaving 0; taking 1 more
        // fails with available:0, requested:1.
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let warehouse = seed_warehouse(&db, "Central").await;
        add_stock(&db, &product.id, &warehouse.id, 5).await;

        let mut tx = db.pool().begin().await.unwrap();
        tx_reserve_and_decrement(&mut tx, &product.id, &warehouse.id, 5, "Product SKU-1")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            db.stock()
                .get_quantity(&product.id, &warehouse.id)
                .await
                .unwrap(),
            0
        );

        let mut tx = db.pool().begin().await.unwrap();
        let err = tx_reserve_and_decrement(&mut tx, &product.id, &warehouse.id, 1, "Product SKU-1")
            .await
            .unwrap_err();
        drop(tx);

        match err {
            DbError::Domain(CoreError::InsufficientStock(shortages)) => {
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].available, 0);
                assert_eq!(shortages[0].requested, 1);
            }
            other => panic!("expected shortage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stock_readers() {
        let db = test_db().await;
        let p1 = seed_product(&db, "SKU-1", 1000).await;
        let p2 = seed_product(&db, "SKU-2", 2000).await;
        let w1 = seed_warehouse(&db, "Central").await;
        let w2 = seed_warehouse(&db, "Norte").await;

        add_stock(&db, &p1.id, &w1.id, 10).await;
        add_stock(&db, &p2.id, &w1.id, 4).await;
        add_stock(&db, &p1.id, &w2.id, 7).await;

        let inventory = db.stock().by_warehouse(&w1.id).await.unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(inventory.iter().any(|i| i.sku == "SKU-1" && i.quantity == 10));

        let locations = db.stock().by_product(&p1.id).await.unwrap();
        assert_eq!(locations.len(), 2);

        // Unknown ids read as empty, not as errors.
        assert!(db.stock().by_warehouse("missing").await.unwrap().is_empty());
        assert!(db.stock().by_product("missing").await.unwrap().is_empty());
    }
}
