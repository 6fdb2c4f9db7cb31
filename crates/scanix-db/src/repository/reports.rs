//! # Reports Repository
//!
//! Read-only dashboard aggregates over committed sales. These reads are
//! not transactionally isolated from concurrent writes; read-committed
//! freshness is enough for a dashboard and they never error on "no data"
//! - empty aggregates come back as zeros and empty lists.

use sqlx::SqlitePool;

use crate::error::DbResult;

/// Top-seller line: units moved and revenue per product.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub name: String,
    pub units: i64,
    pub sales_cents: i64,
}

/// Per-warehouse order count and revenue.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct WarehouseSales {
    pub warehouse_id: String,
    pub name: String,
    pub orders: i64,
    pub sales_cents: i64,
}

/// The dashboard payload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardStats {
    /// Revenue across all sales, in cents.
    pub total_sales_cents: i64,
    /// Number of committed sales.
    pub total_orders: i64,
    /// Units sold across all sale lines.
    pub total_units: i64,
    /// Top 5 products by units sold.
    pub top_products: Vec<TopProduct>,
    /// Orders and revenue per warehouse.
    pub by_warehouse: Vec<WarehouseSales>,
}

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    /// Creates a new ReportsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    /// Computes the dashboard aggregates.
    pub async fn dashboard(&self) -> DbResult<DashboardStats> {
        let (total_sales_cents, total_orders): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_cents), 0), COUNT(id) FROM sales",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_units: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM sale_details")
                .fetch_one(&self.pool)
                .await?;

        let top_products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.name,
                   SUM(d.quantity) AS units,
                   SUM(d.subtotal_cents) AS sales_cents
            FROM sale_details d
            JOIN products p ON p.id = d.product_id
            GROUP BY p.name
            ORDER BY units DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let by_warehouse = sqlx::query_as::<_, WarehouseSales>(
            r#"
            SELECT w.id AS warehouse_id,
                   w.name,
                   COUNT(s.id) AS orders,
                   SUM(s.total_cents) AS sales_cents
            FROM sales s
            JOIN warehouses w ON w.id = s.warehouse_id
            GROUP BY w.id, w.name
            ORDER BY sales_cents DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_sales_cents,
            total_orders,
            total_units,
            top_products,
            by_warehouse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{seed_product, seed_warehouse, add_stock, test_db};
    use scanix_core::{CreateSaleRequest, SaleLine};

    #[tokio::test]
    async fn test_empty_dashboard_is_zeros_not_errors() {
        let db = test_db().await;

        let stats = db.reports().dashboard().await.unwrap();
        assert_eq!(stats.total_sales_cents, 0);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_units, 0);
        assert!(stats.top_products.is_empty());
        assert!(stats.by_warehouse.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_aggregates_committed_sales() {
        let db = test_db().await;
        let p1 = seed_product(&db, "SKU-1", 1000).await;
        let p2 = seed_product(&db, "SKU-2", 500).await;
        let warehouse = seed_warehouse(&db, "Central").await;
        add_stock(&db, &p1.id, &warehouse.id, 100).await;
        add_stock(&db, &p2.id, &warehouse.id, 100).await;

        let sell = |items: Vec<SaleLine>| CreateSaleRequest {
            warehouse_id: warehouse.id.clone(),
            items,
            client: None,
            operator_id: None,
        };
        let line = |product_id: &str, qty| SaleLine {
            product_id: product_id.to_string(),
            quantity: qty,
            unit_price_hint_cents: None,
        };

        db.sales()
            .create_sale(sell(vec![line(&p1.id, 2), line(&p2.id, 3)]))
            .await
            .unwrap();
        db.sales().create_sale(sell(vec![line(&p2.id, 5)])).await.unwrap();

        let stats = db.reports().dashboard().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_units, 10);
        assert_eq!(stats.total_sales_cents, 2 * 1000 + 8 * 500);

        // p2 moved more units, so it leads the top list.
        assert_eq!(stats.top_products[0].units, 8);
        assert_eq!(stats.by_warehouse.len(), 1);
        assert_eq!(stats.by_warehouse[0].orders, 2);
        assert_eq!(stats.by_warehouse[0].sales_cents, stats.total_sales_cents);
    }
}
