//! # Application Error Type
//!
//! The one error type the console shows to the operator.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  Menu action (e.g. "2) Place order")                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Workflow function  → Result<T, AppError>                        │  │
//! │  │         │                                                        │  │
//! │  │  Lookup / rule failure? ── CoreError::NoEligibleCourier ──┐     │  │
//! │  │         │                                                 │     │  │
//! │  │  Store failure? ────────── DbError::QueryFailed(..) ──────┤     │  │
//! │  │         │                                                 ▼     │  │
//! │  │         │                                             AppError  │  │
//! │  └─────────┼─────────────────────────────────────────────────┼─────┘  │
//! │            ▼                                                 ▼        │
//! │        success output                    "✗ [business rule] ..."       │
//! │                                           menu loop continues          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use pizza_core::{CoreError, ValidationError};
use pizza_db::DbError;

/// Error returned from workflow functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    /// Category, for programmatic handling and tests
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An id or code the operator entered does not exist
    NotFound,
    /// Input validation failed
    Validation,
    /// A business rule refused the request (used code, no courier, ...)
    BusinessRule,
    /// A write or read against the store failed
    Persistence,
    /// The store could not be reached
    Connection,
    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not found",
            ErrorCode::Validation => "invalid input",
            ErrorCode::BusinessRule => "business rule",
            ErrorCode::Persistence => "persistence",
            ErrorCode::Connection => "connection",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Validation, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to application errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::CustomerNotFound(_)
            | CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorCode::NotFound,

            CoreError::EmptyOrder | CoreError::Validation(_) => ErrorCode::Validation,

            // An unknown code is refused like a used one
            CoreError::PriceMissing(_)
            | CoreError::DiscountCodeNotFound(_)
            | CoreError::DiscountCodeUsed(_)
            | CoreError::NoEligibleCourier
            | CoreError::OrderAlreadyDelivered(_) => ErrorCode::BusinessRule,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Converts database errors to application errors.
///
/// Store failures are logged and their cause is kept in the message.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                AppError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, .. } => {
                AppError::validation(format!("{} already exists", field))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::validation(format!("Invalid reference: {}", message))
            }
            DbError::CheckViolation(message) => {
                tracing::error!("Check constraint violation: {}", message);
                AppError::validation(format!("Value out of range: {}", message))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::Connection, format!("Database connection failed: {}", e))
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                AppError::new(ErrorCode::Connection, format!("Database migration failed: {}", e))
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::Connection, "Database is busy, try again")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::Persistence, format!("Database operation failed: {}", e))
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::Persistence, format!("Database transaction failed: {}", e))
            }
            DbError::DataCorruption(e) => {
                tracing::error!("Corrupt data: {}", e);
                AppError::new(ErrorCode::Persistence, format!("Stored data could not be read: {}", e))
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::Persistence, format!("Database operation failed: {}", e))
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

// =============================================================================
// Unit Tests
// =============================================================================
