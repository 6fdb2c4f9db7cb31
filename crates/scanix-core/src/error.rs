//! # Error Types
//!
//! Domain-specific error types for scanix-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  scanix-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  scanix-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → HTTP status code     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Stock Shortage
// =============================================================================

/// One line's insufficiency: how much was asked versus what the warehouse
/// holds. A sale collects one of these per failing line before aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockShortage {
    /// Product name (or id when the name is unknown), for the message.
    pub product: String,
    /// Quantity on hand at check time.
    pub available: i64,
    /// Quantity the caller asked for.
    pub requested: i64,
}

impl fmt::Display for StockShortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Insufficient stock for \"{}\" (available: {}, requested: {})",
            self.product, self.available, self.requested
        )
    }
}

fn shortage_lines(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They abort the whole
/// enclosing transaction and are translated to client-facing messages by
/// the HTTP layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more stock lines cannot be satisfied.
    ///
    /// ## When This Occurs
    /// - A sale line requests more than the warehouse holds
    /// - A transfer's source warehouse is short
    /// - A negative stock adjustment would push quantity below zero
    ///
    /// Carries every failing line, not just the first; the display is the
    /// newline-joined list of per-product messages.
    #[error("{}", shortage_lines(.0))]
    InsufficientStock(Vec<StockShortage>),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds an `InsufficientStock` error for a single line.
    pub fn shortage(
        product: impl Into<String>,
        available: i64,
        requested: i64,
    ) -> Self {
        CoreError::InsufficientStock(vec![StockShortage {
            product: product.into(),
            available,
            requested,
        }])
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet requirements, before any
/// business logic runs. Never retried, never partially applied.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A transfer names the same warehouse on both ends.
    #[error("source and destination warehouse must differ")]
    SameWarehouse,

    /// Two quantity ranges in a price-rule set intersect.
    #[error("{field} ranges overlap at quantity {at}")]
    OverlappingRanges { field: String, at: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortage_message() {
        let err = CoreError::shortage("Milk 1L", 3, 5);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for \"Milk 1L\" (available: 3, requested: 5)"
        );
    }

    #[test]
    fn test_shortage_batch_joins_lines() {
        let err = CoreError::InsufficientStock(vec![
            StockShortage {
                product: "Milk 1L".to_string(),
                available: 3,
                requested: 5,
            },
            StockShortage {
                product: "Bread".to_string(),
                available: 0,
                requested: 2,
            },
        ]);

        let msg = err.to_string();
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Milk 1L"));
        assert!(lines[1].contains("Bread"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::OverlappingRanges {
            field: "price_rules".to_string(),
            at: 10,
        };
        assert_eq!(err.to_string(), "price_rules ranges overlap at quantity 10");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::SameWarehouse;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
