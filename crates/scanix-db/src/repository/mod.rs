//! # Repository Module
//!
//! Database repository implementations for Scanix.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                     │
//! │                                                                     │
//! │  HTTP layer                                                         │
//! │       │  db.sales().create_sale(request)                            │
//! │       ▼                                                             │
//! │  SaleRepository                                                     │
//! │  ├── opens ONE transaction                                          │
//! │  ├── calls client::tx_resolve_or_create(&mut tx, ...)               │
//! │  ├── calls stock::tx_reserve_and_decrement(&mut tx, ...)            │
//! │  └── commits, or any error rolls everything back                    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Functions prefixed `tx_` take `&mut SqliteConnection` and run inside
//! the **caller's** transaction; the caller owns begin/commit/rollback.
//! Repository methods on a pool own their transaction boundary.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - catalog CRUD + price-rule replace
//! - [`category::CategoryRepository`] - category CRUD
//! - [`warehouse::WarehouseRepository`] - warehouse CRUD
//! - [`stock::StockRepository`] - stock ledger and readers
//! - [`client::ClientRepository`] - client registry
//! - [`sale::SaleRepository`] - sale transaction
//! - [`transfer::TransferRepository`] - transfer transaction
//! - [`operator::OperatorRepository`] - operator registration / lookup
//! - [`reports::ReportsRepository`] - dashboard aggregates

pub mod category;
pub mod client;
pub mod operator;
pub mod product;
pub mod reports;
pub mod sale;
pub mod stock;
pub mod transfer;
pub mod warehouse;

#[cfg(test)]
pub(crate) mod testutil {
    //! Shared fixtures for repository tests: an isolated in-memory
    //! database plus minimal catalog seeding.

    use scanix_core::{NewProduct, NewWarehouse, PriceRuleSpec, Product, Warehouse};

    use crate::pool::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }

    pub async fn seed_product(db: &Database, sku: &str, price_cents: i64) -> Product {
        seed_product_with_rules(db, sku, price_cents, vec![]).await
    }

    pub async fn seed_product_with_rules(
        db: &Database,
        sku: &str,
        price_cents: i64,
        rules: Vec<PriceRuleSpec>,
    ) -> Product {
        db.products()
            .create(
                NewProduct {
                    sku: sku.to_string(),
                    name: format!("Product {sku}"),
                    description: None,
                    price_cents,
                    category_id: None,
                    image_url: None,
                },
                rules,
            )
            .await
            .expect("seed product")
    }

    pub async fn seed_warehouse(db: &Database, name: &str) -> Warehouse {
        db.warehouses()
            .create(NewWarehouse {
                name: name.to_string(),
                location: None,
            })
            .await
            .expect("seed warehouse")
    }

    pub async fn add_stock(db: &Database, product_id: &str, warehouse_id: &str, quantity: i64) {
        db.stock()
            .adjust(scanix_core::StockAdjustment {
                product_id: product_id.to_string(),
                warehouse_id: warehouse_id.to_string(),
                change: quantity,
            })
            .await
            .expect("seed stock");
    }
}
