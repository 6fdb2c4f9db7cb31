//! # Validation Module
//!
//! Input validation for requests entering the transaction functions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: HTTP boundary (external service)                          │
//! │  ├── Schema/type validation (strict DTO deserialization)            │
//! │  └── Immediate user feedback                                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation                    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / UNIQUE / FK constraints                             │
//! │  └── CHECK (quantity >= 0) backstop on stock                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{SaleLine, TransferRequest};
use crate::{MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use scanix_core::validation::validate_sku;
///
/// assert!(validate_sku("MILK-1L").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, warehouse, category, person).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a DNI (national identity document).
///
/// Kept permissive: formats vary by jurisdiction, so only emptiness and
/// length are checked here. Uniqueness is the database's job.
pub fn validate_dni(dni: &str) -> ValidationResult<()> {
    let dni = dni.trim();

    if dni.is_empty() {
        return Err(ValidationError::Required {
            field: "dni".to_string(),
        });
    }

    if dni.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "dni".to_string(),
            max: 20,
        });
    }

    Ok(())
}

/// Validates an email address shape.
///
/// A full RFC parse buys nothing here; delivery failures are handled by
/// the notifier. This catches the obvious garbage before it is stored.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() || !email.contains('@') || email.len() > 254 {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a plausible email address".to_string(),
        });
    }

    Ok(())
}

/// Validates an entity id argument is present.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (promotional items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a signed stock-adjustment delta.
///
/// Zero is rejected: an adjustment that changes nothing is a caller bug.
pub fn validate_adjustment_change(change: i64) -> ValidationResult<()> {
    if change == 0 {
        return Err(ValidationError::MustBePositive {
            field: "change".to_string(),
        });
    }

    if change.abs() > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "change".to_string(),
            min: -MAX_LINE_QUANTITY,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates the line set of a sale request.
///
/// ## Rules
/// - At least one line, at most MAX_SALE_LINES
/// - Every line has a product id and a valid quantity
pub fn validate_sale_lines(items: &[SaleLine]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    for line in items {
        validate_id("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates a transfer request shape.
///
/// ## Rules
/// - All ids present
/// - Source and destination must differ
/// - Quantity positive and within bounds
pub fn validate_transfer_request(req: &TransferRequest) -> ValidationResult<()> {
    validate_id("product_id", &req.product_id)?;
    validate_id("source_warehouse_id", &req.source_warehouse_id)?;
    validate_id("destination_warehouse_id", &req.destination_warehouse_id)?;

    if req.source_warehouse_id == req.destination_warehouse_id {
        return Err(ValidationError::SameWarehouse);
    }

    validate_quantity(req.quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
