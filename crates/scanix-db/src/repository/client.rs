//! # Client Registry
//!
//! Customer records, upserted by DNI during sale creation.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  resolve_or_create(dni?, name?, surname?, email?)                   │
//! │                                                                     │
//! │  no DNI          → None (anonymous sale)                            │
//! │  DNI known       → existing id; a differing email overwrites the    │
//! │                    stored one (last write wins)                     │
//! │  DNI unknown     → requires name AND surname, creates the row       │
//! │                    (ValidationError otherwise, nothing persisted)   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale creation is the only writer of client email; that keeps the
//! "last known email" semantics coherent.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use scanix_core::validation::{validate_dni, validate_email, validate_name};
use scanix_core::{Client, ClientInfo, ValidationError};

const CLIENT_COLUMNS: &str = "id, name, surname, dni, phone, email, created_at, updated_at";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Transaction-Scoped Operations
// =============================================================================

/// Resolves the client for a sale inside the caller's transaction.
///
/// Returns `None` for anonymous sales. A new client row created here is
/// rolled back with the rest of the sale if anything fails later.
pub async fn tx_resolve_or_create(
    conn: &mut SqliteConnection,
    info: &ClientInfo,
) -> DbResult<Option<String>> {
    let dni = match non_empty(info.dni.as_deref()) {
        Some(dni) => dni,
        None => return Ok(None),
    };
    validate_dni(dni)?;

    let email = non_empty(info.email.as_deref());
    if let Some(email) = email {
        validate_email(email)?;
    }

    let existing = sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE dni = ?1"
    ))
    .bind(dni)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(client) = existing {
        // Back-fill the last known email on repeat visits. Last write
        // wins; there is no conflict detection.
        if let Some(email) = email {
            if client.email.as_deref() != Some(email) {
                debug!(client_id = %client.id, "Updating client email");
                sqlx::query("UPDATE clients SET email = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(&client.id)
                    .bind(email)
                    .bind(Utc::now())
                    .execute(&mut *conn)
                    .await?;
            }
        }
        return Ok(Some(client.id));
    }

    // New DNI: a person record needs at least name and surname.
    let name = non_empty(info.name.as_deref()).ok_or(ValidationError::Required {
        field: "client name".to_string(),
    })?;
    let surname = non_empty(info.surname.as_deref()).ok_or(ValidationError::Required {
        field: "client surname".to_string(),
    })?;
    validate_name("client name", name)?;
    validate_name("client surname", surname)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    debug!(dni = %dni, "Creating client");

    sqlx::query(
        r#"
        INSERT INTO clients (id, name, surname, dni, phone, email, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?6)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(surname)
    .bind(dni)
    .bind(email)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Some(id))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for client lookups.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Looks up a client by DNI. Used by the ticket UI before a sale is
    /// submitted, to pre-fill the customer fields.
    pub async fn get_by_dni(&self, dni: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE dni = ?1"
        ))
        .bind(dni)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
