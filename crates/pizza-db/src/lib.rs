//! # pizza-db: Database Layer for Pizza Ordering
//!
//! This crate provides database access for the ordering system.
//! It uses an embedded SQLite file with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pizza Ordering Data Flow                         │
//! │                                                                         │
//! │  Console workflow (place_order, mark_delivered, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pizza-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ CustomerRepo   │   │ 001_schema   │   │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │   │ 002_prices   │   │   │
//! │  │   │ begin()       │    │ CourierRepo    │   │              │   │   │
//! │  │   │ initialize()  │    │ OrderRepo ...  │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./data/pizza_db.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, transactions, initialization
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pizza_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/pizza_db.db")).await?;
//! db.initialize().await?;
//!
//! let menu = db.products().menu().await?;
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
pub use pool::{Database, DbConfig, DbConnection, DbTransaction};

// Repository re-exports for convenience
pub use repository::{
    CourierRepository, CustomerRepository, DiscountCodeRepository, NewOrder, NewProduct,
    OrderRepository, ProductRepository, StatusRepository,
};
