//! # Product Repository
//!
//! Catalog operations: product CRUD and the volume-pricing rule sets.
//!
//! ## Price-Rule Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Editing a product replaces its WHOLE rule set:                     │
//! │                                                                     │
//! │    UPDATE products ...                                              │
//! │    DELETE FROM price_rules WHERE product_id = ?                     │
//! │    INSERT the new tiers                                             │
//! │                                                                     │
//! │  All in one transaction, and only after the new set passed the      │
//! │  overlap validation - a malformed tier set never reaches disk.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use scanix_core::pricing::validate_rule_set;
use scanix_core::validation::{validate_name, validate_price_cents, validate_sku};
use scanix_core::{NewProduct, PriceRule, PriceRuleSpec, Product};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, description, price_cents, category_id, image_url, created_at, updated_at";
const RULE_COLUMNS: &str =
    "id, product_id, min_quantity, max_quantity, unit_price_cents, created_at";

/// A catalog row enriched for the inventory screen: category name, total
/// stock across all warehouses, and the product's tier set.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ProductDetails {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub total_stock: i64,
    #[sqlx(skip)]
    pub price_rules: Vec<PriceRule>,
}

fn validate_product_input(input: &NewProduct, rules: &[PriceRuleSpec]) -> DbResult<()> {
    validate_sku(&input.sku)?;
    validate_name("name", &input.name)?;
    validate_price_cents(input.price_cents)?;
    validate_rule_set(rules)?;
    Ok(())
}

async fn tx_insert_rules(
    conn: &mut SqliteConnection,
    product_id: &str,
    rules: &[PriceRuleSpec],
) -> DbResult<Vec<PriceRule>> {
    let now = Utc::now();
    let mut inserted = Vec::with_capacity(rules.len());

    for spec in rules {
        let rule = PriceRule {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            min_quantity: spec.min_quantity,
            max_quantity: spec.max_quantity,
            unit_price_cents: spec.unit_price_cents,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO price_rules
                (id, product_id, min_quantity, max_quantity, unit_price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&rule.id)
        .bind(&rule.product_id)
        .bind(rule.min_quantity)
        .bind(rule.max_quantity)
        .bind(rule.unit_price_cents)
        .bind(rule.created_at)
        .execute(&mut *conn)
        .await?;

        inserted.push(rule);
    }

    Ok(inserted)
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product together with its tier set.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - bad SKU/name/price or malformed tiers
    /// * `UniqueViolation` - SKU already exists
    pub async fn create(&self, input: NewProduct, rules: Vec<PriceRuleSpec>) -> DbResult<Product> {
        validate_product_input(&input, &rules)?;

        debug!(sku = %input.sku, rules = rules.len(), "Creating product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: input.sku,
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            category_id: input.category_id,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products
                (id, sku, name, description, price_cents, category_id, image_url,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category_id)
        .bind(&product.image_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx_insert_rules(&mut tx, &product.id, &rules).await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Updates a product in place and fully replaces its tier set
    /// (delete-all + reinsert), in one transaction.
    pub async fn update(
        &self,
        id: &str,
        input: NewProduct,
        rules: Vec<PriceRuleSpec>,
    ) -> DbResult<Product> {
        validate_product_input(&input, &rules)?;

        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                category_id = ?6,
                image_url = COALESCE(?7, image_url),
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(&input.category_id)
        .bind(&input.image_url)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        sqlx::query("DELETE FROM price_rules WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx_insert_rules(&mut tx, id, &rules).await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the whole catalog, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists the tier set of one product, lowest tier first.
    pub async fn price_rules(&self, product_id: &str) -> DbResult<Vec<PriceRule>> {
        let rules = sqlx::query_as::<_, PriceRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM price_rules WHERE product_id = ?1 ORDER BY min_quantity"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    /// Deletes a product; stock rows and price rules cascade with it.
    ///
    /// Products referenced by sale history cannot be deleted (foreign
    /// key violation) - history is immutable.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Catalog view for the inventory screen: every product with its
    /// category name, summed stock across warehouses, and tier set.
    pub async fn list_with_details(&self) -> DbResult<Vec<ProductDetails>> {
        let mut details = sqlx::query_as::<_, ProductDetails>(
            r#"
            SELECT
                p.id, p.sku, p.name, p.description, p.price_cents,
                p.category_id, p.image_url, p.created_at, p.updated_at,
                c.name AS category_name,
                COALESCE(SUM(s.quantity), 0) AS total_stock
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            LEFT JOIN stock s ON s.product_id = p.id
            GROUP BY p.id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // One query for all rule sets, grouped in memory.
        let rules = sqlx::query_as::<_, PriceRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM price_rules ORDER BY product_id, min_quantity"
        ))
        .fetch_all(&self.pool)
        .await?;

        for detail in &mut details {
            detail.price_rules = rules
                .iter()
                .filter(|rule| rule.product_id == detail.product.id)
                .cloned()
                .collect();
        }

        Ok(details)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{seed_warehouse, add_stock, test_db};
    use scanix_core::{CoreError, ValidationError};

    fn input(sku: &str, price_cents: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            description: Some("test".to_string()),
            price_cents,
            category_id: None,
            image_url: None,
        }
    }

    fn tier(min: i64, max: Option<i64>, cents: i64) -> PriceRuleSpec {
        PriceRuleSpec {
            min_quantity: min,
            max_quantity: max,
            unit_price_cents: cents,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_with_rules() {
        let db = test_db().await;

        let product = db
            .products()
            .create(input("SKU-1", 1000), vec![tier(10, Some(49), 800), tier(50, None, 700)])
            .await
            .unwrap();

        let fetched = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.sku, "SKU-1");
        assert_eq!(fetched.price_cents, 1000);

        let rules = db.products().price_rules(&product.id).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].min_quantity, 10);
        assert_eq!(rules[1].max_quantity, None);

        assert!(db.products().get_by_sku("SKU-1").await.unwrap().is_some());
        assert!(db.products().get_by_sku("OTHER").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_conflicts() {
        let db = test_db().await;

        db.products().create(input("SKU-1", 1000), vec![]).await.unwrap();
        let err = db
            .products()
            .create(input("SKU-1", 2000), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_overlapping_rules_rejected_before_write() {
        let db = test_db().await;

        let err = db
            .products()
            .create(
                input("SKU-1", 1000),
                vec![tier(10, Some(30), 800), tier(20, None, 700)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OverlappingRanges { .. }))
        ));
        assert!(db.products().get_by_sku("SKU-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_fully_replaces_rule_set() {
        let db = test_db().await;

        let product = db
            .products()
            .create(input("SKU-1", 1000), vec![tier(10, None, 800)])
            .await
            .unwrap();

        let updated = db
            .products()
            .update(
                &product.id,
                NewProduct {
                    name: "Renamed".to_string(),
                    ..input("SKU-1", 1200)
                },
                vec![tier(5, Some(9), 950), tier(10, None, 850)],
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.price_cents, 1200);

        let rules = db.products().price_rules(&product.id).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].unit_price_cents, 950);

        let err = db
            .products()
            .update("missing", input("SKU-2", 1000), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_rules_and_stock() {
        let db = test_db().await;
        let product = db
            .products()
            .create(input("SKU-1", 1000), vec![tier(10, None, 800)])
            .await
            .unwrap();
        let warehouse = seed_warehouse(&db, "Central").await;
        add_stock(&db, &product.id, &warehouse.id, 5).await;

        db.products().delete(&product.id).await.unwrap();

        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());
        assert!(db.stock().level(&product.id, &warehouse.id).await.unwrap().is_none());

        let orphan_rules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_rules")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphan_rules, 0);

        let err = db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_with_details_sums_stock() {
        let db = test_db().await;
        let product = db
            .products()
            .create(input("SKU-1", 1000), vec![tier(10, None, 800)])
            .await
            .unwrap();
        let w1 = seed_warehouse(&db, "Central").await;
        let w2 = seed_warehouse(&db, "Norte").await;
        add_stock(&db, &product.id, &w1.id, 5).await;
        add_stock(&db, &product.id, &w2.id, 7).await;

        let details = db.products().list_with_details().await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].total_stock, 12);
        assert_eq!(details[0].price_rules.len(), 1);
        assert!(details[0].category_name.is_none());
    }
}
