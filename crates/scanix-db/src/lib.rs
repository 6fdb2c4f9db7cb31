//! # scanix-db: Database Layer for Scanix POS
//!
//! This crate provides database access for the Scanix backend. It uses
//! SQLite for storage with sqlx for async operations, and owns every
//! transaction boundary in the system: sales, transfers and stock
//! adjustments all commit or roll back here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Scanix Data Flow                              │
//! │                                                                     │
//! │  HTTP layer (external) - parses and validates request DTOs          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │                   scanix-db (THIS CRATE)                    │    │
//! │  │                                                             │    │
//! │  │  ┌────────────┐   ┌─────────────────┐   ┌──────────────┐    │    │
//! │  │  │  Database  │   │  Repositories   │   │  Migrations  │    │    │
//! │  │  │  (pool.rs) │◄──│ stock / sale /  │   │  (embedded)  │    │    │
//! │  │  │            │   │ transfer / ...  │   │              │    │    │
//! │  │  └────────────┘   └─────────────────┘   └──────────────┘    │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys ON)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanix_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/scanix.db")).await?;
//!
//! let receipt = db.sales().create_sale(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::client::ClientRepository;
pub use repository::operator::OperatorRepository;
pub use repository::product::ProductRepository;
pub use repository::reports::ReportsRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockRepository;
pub use repository::transfer::TransferRepository;
pub use repository::warehouse::WarehouseRepository;
