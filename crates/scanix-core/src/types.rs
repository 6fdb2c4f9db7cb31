//! # Domain Types
//!
//! Core domain types used throughout Scanix.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐             │
//! │  │   Product    │   │  StockLevel  │   │     Sale     │             │
//! │  │ ──────────── │   │ ──────────── │   │ ──────────── │             │
//! │  │ id (UUID)    │   │ product_id   │   │ id (UUID)    │             │
//! │  │ sku (unique) │   │ warehouse_id │   │ total_cents  │             │
//! │  │ price_cents  │   │ quantity ≥ 0 │   │ client_id?   │             │
//! │  └──────┬───────┘   └──────────────┘   └──────┬───────┘             │
//! │         │                                     │                     │
//! │  ┌──────┴───────┐                      ┌──────┴───────┐             │
//! │  │  PriceRule   │                      │  SaleDetail  │             │
//! │  │ min..max qty │                      │ frozen price │             │
//! │  └──────────────┘                      └──────────────┘             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Request DTOs live here too: the HTTP layer deserializes into these
//! strict shapes before anything reaches the transaction functions, so
//! the db layer can assume well-typed, pre-validated arguments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique per catalog.
    pub sku: String,

    /// Display name shown on tickets and in error messages.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Base unit price in cents; applies when no volume tier matches.
    pub price_cents: i64,

    /// Optional category reference.
    pub category_id: Option<String>,

    /// Optional image reference (URL served by the upload handler).
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A product category. Deleting one leaves its products uncategorized.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    /// Unique display name.
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Price Rules
// =============================================================================

/// A volume-pricing tier: a quantity range mapped to a unit price.
///
/// Belongs to exactly one product; the rule set is fully replaced when
/// the product is edited. Both bounds are inclusive; `max_quantity = None`
/// means "or more".
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PriceRule {
    pub id: String,
    pub product_id: String,
    /// Inclusive lower bound, > 0.
    pub min_quantity: i64,
    /// Inclusive upper bound; None = unbounded.
    pub max_quantity: Option<i64>,
    /// Unit price in cents while the tier applies.
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PriceRule {
    /// Builds a tier without persistence concerns (tests, doc examples).
    pub fn tier(
        product_id: impl Into<String>,
        min_quantity: i64,
        max_quantity: Option<i64>,
        unit_price: Money,
    ) -> Self {
        PriceRule {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: product_id.into(),
            min_quantity,
            max_quantity,
            unit_price_cents: unit_price.cents(),
            created_at: Utc::now(),
        }
    }

    /// Whether this tier covers the requested quantity (both bounds inclusive).
    #[inline]
    pub fn applies_to(&self, quantity: i64) -> bool {
        quantity >= self.min_quantity
            && self.max_quantity.map_or(true, |max| quantity <= max)
    }

    /// Returns the tier price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Price tier as submitted on product create/update, before it has an id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRuleSpec {
    pub min_quantity: i64,
    pub max_quantity: Option<i64>,
    pub unit_price_cents: i64,
}

// =============================================================================
// Warehouses and Stock
// =============================================================================

/// A physical warehouse / branch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Warehouse {
    pub id: String,
    /// Unique display name.
    pub name: String,
    pub location: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Quantity of one product held at one warehouse.
///
/// The mutable heart of the system: every sale and transfer exists to
/// move these counters while keeping `quantity >= 0` at all times.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub id: String,
    pub product_id: String,
    pub warehouse_id: String,
    /// Never negative; absence of a row means zero.
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Clients
// =============================================================================

/// A customer record, upserted by DNI during sale creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub surname: String,
    /// National identity document; unique when present.
    pub dni: Option<String>,
    pub phone: Option<String>,
    /// Last known email; back-filled on repeat visits.
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sales
// =============================================================================

/// A committed sale. Immutable once created; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Sum of line subtotals, computed server-side, in cents.
    pub total_cents: i64,
    pub client_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub operator_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item of a sale.
///
/// Uses the snapshot pattern: `price_per_unit_cents` is the *resolved*
/// tier price at the time of sale, frozen even if rules change later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleDetail {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Resolved unit price at sale time (frozen).
    pub price_per_unit_cents: i64,
    /// quantity × price_per_unit, frozen.
    pub subtotal_cents: i64,
}

impl SaleDetail {
    #[inline]
    pub fn price_per_unit(&self) -> Money {
        Money::from_cents(self.price_per_unit_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A fully-resolved sale: the committed row plus its frozen lines.
/// This is what external consumers (ticket printer, notifier) receive.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub lines: Vec<SaleDetail>,
}

// =============================================================================
// Operators
// =============================================================================

/// A store operator (cashier). DNI is the login identifier.
///
/// The password column is stored as received; credential handling beyond
/// the lookup is the auth layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Operator {
    pub id: String,
    pub dni: String,
    pub name: String,
    pub surname: String,
    pub password: String,
    /// Warehouse this operator sells from.
    pub warehouse_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Operator profile returned by credential lookup; no password, warehouse
/// name joined in for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OperatorProfile {
    pub id: String,
    pub dni: String,
    pub name: String,
    pub surname: String,
    pub warehouse_id: String,
    pub warehouse_name: String,
}

/// Request-scoped operator identity, derived from an authenticated
/// session and passed explicitly into every transaction call. Nothing in
/// the core reads ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperatorContext {
    pub operator_id: String,
    pub warehouse_id: String,
}

// =============================================================================
// Request DTOs
// =============================================================================

/// Product fields as submitted on create or full update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
}

/// Warehouse fields as submitted on create or update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewWarehouse {
    pub name: String,
    pub location: Option<String>,
}

/// Operator registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOperator {
    pub dni: String,
    pub name: String,
    pub surname: String,
    pub password: String,
    pub warehouse_id: String,
}

/// Customer identification attached to a sale. All fields optional; an
/// absent DNI means an anonymous sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInfo {
    pub dni: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

/// One line of a sale request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price the client computed for display. Advisory only: the
    /// server re-resolves the price from the authoritative rule set and
    /// ignores this value (a mismatch is logged).
    pub unit_price_hint_cents: Option<i64>,
}

/// A sale as submitted by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub warehouse_id: String,
    pub items: Vec<SaleLine>,
    pub client: Option<ClientInfo>,
    pub operator_id: Option<String>,
}

/// A single-product stock movement between two warehouses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferRequest {
    pub product_id: String,
    pub source_warehouse_id: String,
    pub destination_warehouse_id: String,
    pub quantity: i64,
}

/// One product of a batch transfer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferItem {
    pub product_id: String,
    pub quantity: i64,
}

/// A signed stock correction for one (product, warehouse) pair.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub product_id: String,
    pub warehouse_id: String,
    /// Positive receives stock, negative removes it. Never zero.
    pub change: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
