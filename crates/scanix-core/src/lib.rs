//! # scanix-core: Pure Business Logic for Scanix POS
//!
//! This crate is the **heart** of the Scanix inventory/point-of-sale backend.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Scanix Architecture                            │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP layer (external service)               │   │
//! │  │   catalog, stock, transfers, sales, clients, reports        │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │ typed DTOs                         │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │              ★ scanix-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐     │   │
//! │  │  │  types   │ │  money   │ │ pricing  │ │ validation │     │   │
//! │  │  │ Product  │ │  Money   │ │ resolve  │ │   rules    │     │   │
//! │  │  │  Sale    │ │  cents   │ │  tiers   │ │   checks   │     │   │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └────────────┘     │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                    │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                 scanix-db (Database Layer)                  │   │
//! │  │     SQLite queries, migrations, transactional repos         │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Stock, Sale, Client, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Volume-pricing resolution and rule-set validation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use scanix_core::money::Money;
//! use scanix_core::pricing::resolve_unit_price;
//! use scanix_core::types::PriceRule;
//!
//! // Base price $10.00, "10 or more" tier at $8.00
//! let rule = PriceRule::tier("prod-1", 10, None, Money::from_cents(800));
//!
//! let unit = resolve_unit_price(Money::from_cents(1000), &[rule], 12);
//! assert_eq!(unit.cents(), 800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use scanix_core::Money` instead of
// `use scanix_core::money::Money`

pub use error::{CoreError, StockShortage, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway carts and keeps one sale a short-lived transaction.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single product in one sale line or transfer.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
