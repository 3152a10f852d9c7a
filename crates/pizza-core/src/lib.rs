//! # pizza-core: Pure Business Logic for Pizza Ordering
//!
//! This crate holds every business rule of the ordering system as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pizza Ordering Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Console (apps/cli)                           │   │
//! │  │    Menu ──► Place Order ──► Add Customer ──► Mark Delivered     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pizza-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │  courier  │  │  postal   │  │   │
//! │  │   │ Customer  │  │ Discounts │  │ Cooldown  │  │  Prefix   │  │   │
//! │  │   │  Order    │  │ Breakdown │  │ Selection │  │  Extract  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pizza-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, PricedProduct, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Base total and the loyalty → birthday → code discount chain
//! - [`courier`] - Courier eligibility and deterministic selection
//! - [`postal`] - Postal prefix extraction from free-text addresses
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use pizza_core::money::Money;
//!
//! let price = Money::from_cents(2100); // €21.00
//! let loyalty = price.percent(10);
//! assert_eq!(loyalty.cents(), 210);
//! assert_eq!((price - loyalty).to_string(), "€18.90");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod courier;
pub mod error;
pub mod money;
pub mod postal;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use postal::PostalPrefix;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in one order.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 100 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Prior pizza count from which the loyalty discount applies.
pub const LOYALTY_THRESHOLD: i64 = 10;

/// Loyalty discount in percent.
pub const LOYALTY_PERCENT: u32 = 10;

/// Minutes a courier stays ineligible after completing a delivery.
pub const COURIER_COOLDOWN_MINUTES: i64 = 30;
