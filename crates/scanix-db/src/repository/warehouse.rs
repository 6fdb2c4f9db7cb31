//! # Warehouse Repository
//!
//! CRUD for warehouses. Deleting a warehouse cascades to its stock rows
//! and operators; sales that reference it keep it alive (history is
//! immutable).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use scanix_core::validation::validate_name;
use scanix_core::{NewWarehouse, Warehouse};

const WAREHOUSE_COLUMNS: &str = "id, name, location, created_at, updated_at";

/// Repository for warehouse database operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    /// Creates a new WarehouseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    /// Inserts a warehouse. The name is unique across the chain.
    pub async fn create(&self, input: NewWarehouse) -> DbResult<Warehouse> {
        validate_name("name", &input.name)?;

        debug!(name = %input.name, "Creating warehouse");

        let now = Utc::now();
        let warehouse = Warehouse {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            location: input.location,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO warehouses (id, name, location, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(warehouse.created_at)
        .bind(warehouse.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(warehouse)
    }

    /// Lists all warehouses, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(warehouses)
    }

    /// Gets a warehouse by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(warehouse)
    }

    /// Updates name and location.
    pub async fn update(&self, id: &str, input: NewWarehouse) -> DbResult<Warehouse> {
        validate_name("name", &input.name)?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE warehouses SET name = ?2, location = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.location)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", id));
        }

        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(warehouse)
    }

    /// Deletes a warehouse; its stock rows and operators cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting warehouse");

        let result = sqlx::query("DELETE FROM warehouses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", id));
        }

        Ok(())
    }
}
