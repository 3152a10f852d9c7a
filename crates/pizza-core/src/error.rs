//! # Error Types
//!
//! Domain-specific error types for pizza-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pizza-core errors (this file)                                         │
//! │  ├── CoreError        - Lookup and business rule failures              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pizza-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → Console      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (id, code, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant except `Validation` is either a lookup failure or a
/// business-rule failure. Both abort an order before anything is written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Customer id does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Product exists but has no row in the priced view.
    #[error("No price available for product {0}")]
    PriceMissing(i64),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// An order needs at least one line.
    #[error("Order has no items")]
    EmptyOrder,

    /// Discount code string is unknown.
    #[error("Discount code not found: {0}")]
    DiscountCodeNotFound(String),

    /// Discount code was already consumed by an earlier order.
    ///
    /// ## When This Occurs
    /// ```text
    /// Order #1 uses WELCOME10 ──► is_used = 1
    ///      │
    ///      ▼
    /// Order #2 enters WELCOME10
    ///      │
    ///      ▼
    /// DiscountCodeUsed("WELCOME10") ──► order aborted, nothing written
    /// ```
    #[error("Discount code {0} has already been used")]
    DiscountCodeUsed(String),

    /// No courier satisfies the eligibility predicate.
    #[error("No delivery person is available right now")]
    NoEligibleCourier,

    /// Order is already in DELIVERED status.
    #[error("Order {0} has already been delivered")]
    OrderAlreadyDelivered(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., invalid date, invalid postal prefix).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
