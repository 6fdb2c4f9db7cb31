//! # Sale Transaction
//!
//! The all-or-nothing checkout path.
//!
//! ## Orchestration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       create_sale()                                 │
//! │                                                                     │
//! │  1. Validate request shape (lines, warehouse)        ─┐             │
//! │  2. Resolve/create client (registry)                  │ one         │
//! │  3. Check EVERY line's stock, accumulate shortages    │ SQLite      │
//! │  4. Resolve unit prices from the rule set (server)    │ transaction │
//! │  5. Insert sale with computed total                   │             │
//! │  6. Per line: guarded decrement + frozen detail row  ─┘             │
//! │  7. Commit - or any error rolls back ALL of the above               │
//! │                                                                     │
//! │  Partial sales never exist: a single short line aborts the whole    │
//! │  cart, and the aggregate error lists every shortfall at once.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are resolved **server-side** against the authoritative rule
//! set. The request's `unit_price_hint_cents` (what the client displayed)
//! is compared for observability and otherwise ignored; a tampered or
//! stale hint cannot move the total.
//!
//! Lines are processed in ascending product-id order so two sales over
//! overlapping product sets acquire their row writes in the same order.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{client, stock};
use scanix_core::pricing::resolve_unit_price;
use scanix_core::validation::{validate_id, validate_sale_lines};
use scanix_core::{
    CoreError, CreateSaleRequest, PriceRule, Product, Sale, SaleDetail, SaleReceipt, StockShortage,
};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, description, price_cents, category_id, image_url, created_at, updated_at";
const RULE_COLUMNS: &str =
    "id, product_id, min_quantity, max_quantity, unit_price_cents, created_at";
const DETAIL_COLUMNS: &str =
    "id, sale_id, product_id, quantity, price_per_unit_cents, subtotal_cents";

/// A line after server-side price resolution, ready to persist.
struct PricedLine {
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
}

/// Repository for sale transactions and lookups.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale. All-or-nothing: on any failure no sale row, no
    /// stock mutation and no client creation survives.
    pub async fn create_sale(&self, req: CreateSaleRequest) -> DbResult<SaleReceipt> {
        validate_id("warehouse_id", &req.warehouse_id)?;
        validate_sale_lines(&req.items)?;

        debug!(
            warehouse_id = %req.warehouse_id,
            lines = req.items.len(),
            "Creating sale"
        );

        // Consistent write order across concurrent sales.
        let mut lines = req.items.clone();
        lines.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        let mut tx = self.pool.begin().await?;

        let warehouse_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM warehouses WHERE id = ?1")
                .bind(&req.warehouse_id)
                .fetch_optional(&mut *tx)
                .await?;
        if warehouse_exists.is_none() {
            return Err(DbError::not_found("Warehouse", &req.warehouse_id));
        }

        let client_id = match &req.client {
            Some(info) => client::tx_resolve_or_create(&mut tx, info).await?,
            None => None,
        };

        // Check every line before touching anything, collecting all
        // shortfalls so the caller sees the full picture at once.
        let mut shortages: Vec<StockShortage> = Vec::new();
        let mut priced: Vec<PricedLine> = Vec::new();

        for line in &lines {
            let product = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
            ))
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            let available =
                stock::tx_quantity(&mut tx, &line.product_id, &req.warehouse_id).await?;
            if available < line.quantity {
                shortages.push(StockShortage {
                    product: product.name,
                    available,
                    requested: line.quantity,
                });
                continue;
            }

            let rules = sqlx::query_as::<_, PriceRule>(&format!(
                "SELECT {RULE_COLUMNS} FROM price_rules WHERE product_id = ?1 ORDER BY min_quantity"
            ))
            .bind(&line.product_id)
            .fetch_all(&mut *tx)
            .await?;

            let unit_price = resolve_unit_price(product.price(), &rules, line.quantity);

            if let Some(hint) = line.unit_price_hint_cents {
                if hint != unit_price.cents() {
                    warn!(
                        product_id = %line.product_id,
                        hint_cents = hint,
                        resolved_cents = unit_price.cents(),
                        "Client price hint differs from server resolution; using server price"
                    );
                }
            }

            priced.push(PricedLine {
                product_id: line.product_id.clone(),
                product_name: product.name,
                quantity: line.quantity,
                unit_price_cents: unit_price.cents(),
            });
        }

        if !shortages.is_empty() {
            return Err(CoreError::InsufficientStock(shortages).into());
        }

        let total_cents: i64 = priced
            .iter()
            .map(|line| line.unit_price_cents * line.quantity)
            .sum();

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            total_cents,
            client_id,
            warehouse_id: Some(req.warehouse_id.clone()),
            operator_id: req.operator_id.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, total_cents, client_id, warehouse_id, operator_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.total_cents)
        .bind(&sale.client_id)
        .bind(&sale.warehouse_id)
        .bind(&sale.operator_id)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut details: Vec<SaleDetail> = Vec::with_capacity(priced.len());

        for line in &priced {
            // Guarded decrement: re-validates sufficiency at write time,
            // so even a duplicate product across two lines cannot push
            // the counter negative.
            stock::tx_reserve_and_decrement(
                &mut tx,
                &line.product_id,
                &req.warehouse_id,
                line.quantity,
                &line.product_name,
            )
            .await?;

            let detail = SaleDetail {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price_per_unit_cents: line.unit_price_cents,
                subtotal_cents: line.unit_price_cents * line.quantity,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_details
                    (id, sale_id, product_id, quantity, price_per_unit_cents, subtotal_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&detail.id)
            .bind(&detail.sale_id)
            .bind(&detail.product_id)
            .bind(detail.quantity)
            .bind(detail.price_per_unit_cents)
            .bind(detail.subtotal_cents)
            .execute(&mut *tx)
            .await?;

            details.push(detail);
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total = %sale.total(),
            lines = details.len(),
            "Sale committed"
        );

        Ok(SaleReceipt {
            sale,
            lines: details,
        })
    }

    /// Gets a committed sale with its frozen lines. This is the shape
    /// the external notifier formats; delivery is not our concern.
    pub async fn get_by_id(&self, sale_id: &str) -> DbResult<Option<SaleReceipt>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, total_cents, client_id, warehouse_id, operator_id, created_at \
             FROM sales WHERE id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        let sale = match sale {
            Some(sale) => sale,
            None => return Ok(None),
        };

        let lines = sqlx::query_as::<_, SaleDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM sale_details WHERE sale_id = ?1"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SaleReceipt { sale, lines }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
