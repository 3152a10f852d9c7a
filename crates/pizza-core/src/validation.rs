//! # Validation Module
//!
//! Input validation for everything an operator types at the console.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console prompt                                               │
//! │  └── Numeric parsing (menu choice, ids, quantities)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, date format                             │
//! │  └── Quantity range                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check here runs before any write, so a validation failure never
//! leaves a trace in the store.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::NewCustomer;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format accepted for birth dates.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and checks it is non-empty and at most `max` characters.
///
/// ## Example
/// ```rust
/// use pizza_core::validation::validate_required;
///
/// assert_eq!(validate_required("name", "  Anna ", 100).unwrap(), "Anna");
/// assert!(validate_required("name", "   ", 100).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a phone number: digits, spaces, `+`, `-`, parentheses.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = validate_required("phone", phone, 30)?;

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        || !phone.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain digits and only + - ( ) or spaces".to_string(),
        });
    }

    Ok(phone)
}

/// Parses a birth date in `YYYY-MM-DD` form.
///
/// ## Rules
/// - Must be a real calendar date
/// - Must not be after `today`
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pizza_core::validation::parse_birth_date;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// assert!(parse_birth_date("1990-02-28", today).is_ok());
/// assert!(parse_birth_date("1990-02-30", today).is_err());
/// assert!(parse_birth_date("28/02/1990", today).is_err());
/// ```
pub fn parse_birth_date(value: &str, today: NaiveDate) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "birth date".to_string(),
        });
    }

    let date = NaiveDate::parse_from_str(value, BIRTH_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: "birth date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })?;

    if date > today {
        return Err(ValidationError::InvalidFormat {
            field: "birth date".to_string(),
            reason: "cannot be in the future".to_string(),
        });
    }

    Ok(date)
}

/// Validates and normalises raw customer input.
pub fn validate_new_customer(
    name: &str,
    birth_date: &str,
    address: &str,
    phone: &str,
    today: NaiveDate,
) -> ValidationResult<NewCustomer> {
    Ok(NewCustomer {
        name: validate_required("name", name, 100)?,
        birth_date: parse_birth_date(birth_date, today)?,
        address: validate_required("address", address, 200)?,
        phone: validate_phone(phone)?,
    })
}

/// Normalises a discount code: trimmed and upper-cased.
pub fn normalize_discount_code(code: &str) -> ValidationResult<String> {
    Ok(validate_required("discount code", code, 32)?.to_ascii_uppercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Place Order: add line                                                  │
/// │                                                                         │
/// │  Operator enters quantity: 2                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → line added                                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a discount percentage (0-100).
pub fn validate_percent(percent: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a numeric entity id typed by the operator.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("name", "Anna", 10).unwrap(), "Anna");
        assert!(validate_required("name", "", 10).is_err());
        assert!(validate_required("name", &"A".repeat(11), 10).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+31 6 1234 5678").is_ok());
        assert!(validate_phone("(043) 123-4567").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("+-").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(
            parse_birth_date(" 1990-10-16 ", today()).unwrap(),
            NaiveDate::from_ymd_opt(1990, 10, 16).unwrap()
        );
        assert!(parse_birth_date("1990-13-01", today()).is_err());
        assert!(parse_birth_date("2030-01-01", today()).is_err());
        assert!(matches!(
            parse_birth_date("", today()),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_new_customer() {
        let c = validate_new_customer(
            " Anna ",
            "1990-10-16",
            "Grote Gracht 12, 6211 SZ Maastricht",
            "0612345678",
            today(),
        )
        .unwrap();
        assert_eq!(c.name, "Anna");

        assert!(validate_new_customer("Anna", "1990-10-16", "", "0612345678", today()).is_err());
    }

    #[test]
    fn test_normalize_discount_code() {
        assert_eq!(normalize_discount_code(" welcome10 ").unwrap(), "WELCOME10");
        assert!(normalize_discount_code("  ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_percent_and_id() {
        assert!(validate_percent(0).is_ok());
        assert!(validate_percent(100).is_ok());
        assert!(validate_percent(101).is_err());
        assert!(validate_id("order id", 1).is_ok());
        assert!(validate_id("order id", 0).is_err());
    }
}
