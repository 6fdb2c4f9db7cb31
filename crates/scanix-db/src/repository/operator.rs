//! # Operator Repository
//!
//! Store operators (cashiers). DNI is the login identifier; the
//! credential check is a plain lookup the auth layer wraps in a session.
//! An operator's profile carries the warehouse they sell from - the
//! source of the request-scoped `OperatorContext` every sale receives.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use scanix_core::validation::{validate_dni, validate_id, validate_name};
use scanix_core::{NewOperator, Operator, OperatorProfile, ValidationError};

/// Repository for operator database operations.
#[derive(Debug, Clone)]
pub struct OperatorRepository {
    pool: SqlitePool,
}

impl OperatorRepository {
    /// Creates a new OperatorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OperatorRepository { pool }
    }

    /// Registers an operator assigned to a warehouse.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - missing fields or duplicate DNI
    /// * `ForeignKeyViolation` - unknown warehouse
    pub async fn register(&self, input: NewOperator) -> DbResult<Operator> {
        validate_dni(&input.dni)?;
        validate_name("name", &input.name)?;
        validate_name("surname", &input.surname)?;
        validate_id("warehouse_id", &input.warehouse_id)?;
        if input.password.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "password".to_string(),
            }
            .into());
        }

        let existing: Option<String> = sqlx::query_scalar("SELECT id FROM operators WHERE dni = ?1")
            .bind(&input.dni)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(ValidationError::Duplicate {
                field: "dni".to_string(),
                value: input.dni,
            }
            .into());
        }

        debug!(dni = %input.dni, warehouse_id = %input.warehouse_id, "Registering operator");

        let operator = Operator {
            id: Uuid::new_v4().to_string(),
            dni: input.dni,
            name: input.name,
            surname: input.surname,
            password: input.password,
            warehouse_id: input.warehouse_id,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO operators (id, dni, name, surname, password, warehouse_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&operator.id)
        .bind(&operator.dni)
        .bind(&operator.name)
        .bind(&operator.surname)
        .bind(&operator.password)
        .bind(&operator.warehouse_id)
        .bind(operator.created_at)
        .execute(&self.pool)
        .await?;

        Ok(operator)
    }

    /// Looks up an operator by DNI and password, joined with their
    /// warehouse name. `None` means the credentials don't match.
    pub async fn verify_credentials(
        &self,
        dni: &str,
        password: &str,
    ) -> DbResult<Option<OperatorProfile>> {
        let profile = sqlx::query_as::<_, OperatorProfile>(
            r#"
            SELECT o.id, o.dni, o.name, o.surname, o.warehouse_id,
                   w.name AS warehouse_name
            FROM operators o
            JOIN warehouses w ON w.id = o.warehouse_id
            WHERE o.dni = ?1 AND o.password = ?2
            "#,
        )
        .bind(dni)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{seed_warehouse, test_db};
    use scanix_core::CoreError;

    fn input(dni: &str, warehouse_id: &str) -> NewOperator {
        NewOperator {
            dni: dni.to_string(),
            name: "Juan".to_string(),
            surname: "Pérez".to_string(),
            password: "secret".to_string(),
            warehouse_id: warehouse_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let db = test_db().await;
        let warehouse = seed_warehouse(&db, "Central").await;

        db.operators().register(input("30123456", &warehouse.id)).await.unwrap();

        let profile = db
            .operators()
            .verify_credentials("30123456", "secret")
            .await
            .unwrap()
            .expect("profile");
        assert_eq!(profile.warehouse_id, warehouse.id);
        assert_eq!(profile.warehouse_name, "Central");

        assert!(db
            .operators()
            .verify_credentials("30123456", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(db
            .operators()
            .verify_credentials("99999999", "secret")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_dni_rejected() {
        let db = test_db().await;
        let warehouse = seed_warehouse(&db, "Central").await;

        db.operators().register(input("30123456", &warehouse.id)).await.unwrap();
        let err = db
            .operators()
            .register(input("30123456", &warehouse.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_warehouse_rejected() {
        let db = test_db().await;

        let err = db.operators().register(input("30123456", "missing")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
