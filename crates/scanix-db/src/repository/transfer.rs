//! # Transfer Transaction
//!
//! Stock movements between warehouses.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      transfer_batch()                               │
//! │                                                                     │
//! │  ONE transaction for the whole batch:                               │
//! │    for each product (ascending id):                                 │
//! │      1. guarded decrement at source  (short ⇒ abort everything)     │
//! │      2. deposit at destination       (create row if absent)         │
//! │    commit                                                           │
//! │                                                                     │
//! │  A failure on item N rolls back items 1..N-1 too. Stock is never    │
//! │  left decremented at the source without the matching increment at   │
//! │  the destination, and a multi-product batch is all-or-nothing.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `transfer` is the single-product case of the same code path.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::stock;
use scanix_core::validation::{validate_id, validate_quantity, validate_transfer_request};
use scanix_core::{TransferItem, TransferRequest, ValidationError};

/// Repository for transfer transactions.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    /// Moves one product between two warehouses, atomically.
    pub async fn transfer(&self, req: TransferRequest) -> DbResult<()> {
        validate_transfer_request(&req)?;

        self.transfer_batch(
            &req.source_warehouse_id,
            &req.destination_warehouse_id,
            &[TransferItem {
                product_id: req.product_id,
                quantity: req.quantity,
            }],
        )
        .await
    }

    /// Moves a set of products between two warehouses in ONE
    /// transaction; any failure rolls back every leg of every item.
    pub async fn transfer_batch(
        &self,
        source_warehouse_id: &str,
        destination_warehouse_id: &str,
        items: &[TransferItem],
    ) -> DbResult<()> {
        validate_id("source_warehouse_id", source_warehouse_id)?;
        validate_id("destination_warehouse_id", destination_warehouse_id)?;
        if source_warehouse_id == destination_warehouse_id {
            return Err(ValidationError::SameWarehouse.into());
        }
        if items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        for item in items {
            validate_id("product_id", &item.product_id)?;
            validate_quantity(item.quantity)?;
        }

        debug!(
            source = %source_warehouse_id,
            destination = %destination_warehouse_id,
            items = items.len(),
            "Transferring stock"
        );

        // Consistent write order across concurrent transfers and sales.
        let mut items: Vec<&TransferItem> = items.iter().collect();
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        let mut tx = self.pool.begin().await?;

        for warehouse_id in [source_warehouse_id, destination_warehouse_id] {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM warehouses WHERE id = ?1")
                    .bind(warehouse_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(DbError::not_found("Warehouse", warehouse_id));
            }
        }

        for item in &items {
            let product_name: Option<String> =
                sqlx::query_scalar("SELECT name FROM products WHERE id = ?1")
                    .bind(&item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let product_name =
                product_name.ok_or_else(|| DbError::not_found("Product", &item.product_id))?;

            stock::tx_reserve_and_decrement(
                &mut tx,
                &item.product_id,
                source_warehouse_id,
                item.quantity,
                &product_name,
            )
            .await?;

            stock::tx_deposit(
                &mut tx,
                &item.product_id,
                destination_warehouse_id,
                item.quantity,
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            source = %source_warehouse_id,
            destination = %destination_warehouse_id,
            items = items.len(),
            "Transfer committed"
        );

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{seed_product, seed_warehouse, add_stock, test_db};
    use scanix_core::CoreError;

    fn req(product_id: &str, source: &str, destination: &str, quantity: i64) -> TransferRequest {
        TransferRequest {
            product_id: product_id.to_string(),
            source_warehouse_id: source.to_string(),
            destination_warehouse_id: destination.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_transfer_moves_stock_and_creates_destination_row() {
        // W1 holds 10, W2 holds nothing. Moving 10 leaves W1=0, W2=10.
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let w1 = seed_warehouse(&db, "Central").await;
        let w2 = seed_warehouse(&db, "Norte").await;
        add_stock(&db, &product.id, &w1.id, 10).await;

        db.transfers()
            .transfer(req(&product.id, &w1.id, &w2.id, 10))
            .await
            .unwrap();

        assert_eq!(db.stock().get_quantity(&product.id, &w1.id).await.unwrap(), 0);
        assert_eq!(db.stock().get_quantity(&product.id, &w2.id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_short_source_rolls_back_both_legs() {
        // Moving 11 out of 10 fails entirely: W1 keeps 10, W2 stays empty.
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let w1 = seed_warehouse(&db, "Central").await;
        let w2 = seed_warehouse(&db, "Norte").await;
        add_stock(&db, &product.id, &w1.id, 10).await;

        let err = db
            .transfers()
            .transfer(req(&product.id, &w1.id, &w2.id, 11))
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock(shortages)) => {
                assert_eq!(shortages[0].available, 10);
                assert_eq!(shortages[0].requested, 11);
            }
            other => panic!("expected shortage, got {other:?}"),
        }

        assert_eq!(db.stock().get_quantity(&product.id, &w1.id).await.unwrap(), 10);
        assert_eq!(db.stock().get_quantity(&product.id, &w2.id).await.unwrap(), 0);
        assert!(db.stock().level(&product.id, &w2.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_warehouse_and_bad_quantity_rejected() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let w1 = seed_warehouse(&db, "Central").await;

        let err = db
            .transfers()
            .transfer(req(&product.id, &w1.id, &w1.id, 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::SameWarehouse))
        ));

        let w2 = seed_warehouse(&db, "Norte").await;
        let err = db
            .transfers()
            .transfer(req(&product.id, &w1.id, &w2.id, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_warehouse_or_product_not_found() {
        let db = test_db().await;
        let product = seed_product(&db, "SKU-1", 1000).await;
        let w1 = seed_warehouse(&db, "Central").await;

        let err = db
            .transfers()
            .transfer(req(&product.id, &w1.id, "missing", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let w2 = seed_warehouse(&db, "Norte").await;
        let err = db
            .transfers()
            .transfer(req("missing", &w1.id, &w2.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let db = test_db().await;
        let p1 = seed_product(&db, "SKU-1", 1000).await;
        let p2 = seed_product(&db, "SKU-2", 1000).await;
        let w1 = seed_warehouse(&db, "Central").await;
        let w2 = seed_warehouse(&db, "Norte").await;
        add_stock(&db, &p1.id, &w1.id, 10).await;
        add_stock(&db, &p2.id, &w1.id, 1).await;

        let items = vec![
            TransferItem {
                product_id: p1.id.clone(),
                quantity: 5,
            },
            TransferItem {
                product_id: p2.id.clone(),
                quantity: 2, // short
            },
        ];

        let err = db
            .transfers()
            .transfer_batch(&w1.id, &w2.id, &items)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock(_))));

        // The satisfiable item was rolled back with the failing one.
        assert_eq!(db.stock().get_quantity(&p1.id, &w1.id).await.unwrap(), 10);
        assert_eq!(db.stock().get_quantity(&p1.id, &w2.id).await.unwrap(), 0);
        assert_eq!(db.stock().get_quantity(&p2.id, &w1.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_success_moves_everything() {
        let db = test_db().await;
        let p1 = seed_product(&db, "SKU-1", 1000).await;
        let p2 = seed_product(&db, "SKU-2", 1000).await;
        let w1 = seed_warehouse(&db, "Central").await;
        let w2 = seed_warehouse(&db, "Norte").await;
        add_stock(&db, &p1.id, &w1.id, 10).await;
        add_stock(&db, &p2.id, &w1.id, 10).await;
        add_stock(&db, &p1.id, &w2.id, 3).await;

        let items = vec![
            TransferItem {
                product_id: p1.id.clone(),
                quantity: 4,
            },
            TransferItem {
                product_id: p2.id.clone(),
                quantity: 10,
            },
        ];

        db.transfers()
            .transfer_batch(&w1.id, &w2.id, &items)
            .await
            .unwrap();

        assert_eq!(db.stock().get_quantity(&p1.id, &w1.id).await.unwrap(), 6);
        assert_eq!(db.stock().get_quantity(&p1.id, &w2.id).await.unwrap(), 7);
        assert_eq!(db.stock().get_quantity(&p2.id, &w1.id).await.unwrap(), 0);
        assert_eq!(db.stock().get_quantity(&p2.id, &w2.id).await.unwrap(), 10);
    }
}
