//! # Postal Prefix
//!
//! Couriers cover delivery areas identified by the leading four digits of a
//! postal code. Customer addresses are free text, so the prefix is pulled
//! out of the address rather than stored separately.
//!
//! ## Accepted Input Shape
//! ```text
//! "Grote Gracht 12, 6211 SZ Maastricht"
//!               ──          ────
//!               │           └── first run of ≥ 4 ASCII digits → "6211"
//!               └── run of 2 digits, skipped
//!
//! "Pand 123456"        → "1234"  (first four digits of a longer run)
//! "Rue de la Paix 12"  → None    (no run of four digits)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Number of digits in a postal prefix.
pub const PREFIX_LEN: usize = 4;

/// A four-digit postal prefix, e.g. `6211`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalPrefix(String);

impl PostalPrefix {
    /// Finds the first four consecutive ASCII digits in `address`.
    ///
    /// ## Example
    /// ```rust
    /// use pizza_core::PostalPrefix;
    ///
    /// let prefix = PostalPrefix::extract("Tongersestraat 53, 6211 LM Maastricht");
    /// assert_eq!(prefix.unwrap().as_str(), "6211");
    /// assert!(PostalPrefix::extract("no digits here").is_none());
    /// ```
    pub fn extract(address: &str) -> Option<Self> {
        let bytes = address.as_bytes();
        let mut run_start = 0;
        let mut run_len = 0;

        for (i, b) in bytes.iter().enumerate() {
            if b.is_ascii_digit() {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len == PREFIX_LEN {
                    // ASCII digits are single bytes, so this slice is valid UTF-8.
                    return Some(PostalPrefix(address[run_start..=i].to_string()));
                }
            } else {
                run_len = 0;
            }
        }

        None
    }

    /// Parses a value that must be exactly four ASCII digits.
    ///
    /// ## Example
    /// ```rust
    /// use pizza_core::PostalPrefix;
    ///
    /// assert!(PostalPrefix::parse("6211").is_ok());
    /// assert!(PostalPrefix::parse("621").is_err());
    /// assert!(PostalPrefix::parse("62AB").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if value.len() != PREFIX_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "postal prefix".to_string(),
                reason: format!("expected exactly {} digits", PREFIX_LEN),
            });
        }
        Ok(PostalPrefix(value.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalPrefix {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PostalPrefix::parse(&value)
    }
}

impl From<PostalPrefix> for String {
    fn from(prefix: PostalPrefix) -> Self {
        prefix.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(s: &str) -> Option<String> {
        PostalPrefix::extract(s).map(String::from)
    }

    #[test]
    fn test_extract_skips_short_runs() {
        assert_eq!(
            extract("Grote Gracht 12, 6211 SZ Maastricht").as_deref(),
            Some("6211")
        );
        assert_eq!(extract("Nr 1 2 3 4, 6229ER").as_deref(), Some("6229"));
    }

    #[test]
    fn test_extract_takes_first_four_of_longer_run() {
        assert_eq!(extract("Pand 123456").as_deref(), Some("1234"));
    }

    #[test]
    fn test_extract_first_match_wins() {
        assert_eq!(extract("6211 AB, also 6229 CD").as_deref(), Some("6211"));
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("Rue de la Paix 12"), None);
        assert_eq!(extract("12-34-56"), None);
    }

    #[test]
    fn test_extract_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not postal digits
        assert_eq!(extract("٦٢١١ street"), None);
        assert_eq!(extract("straße 6211"), Some("6211".to_string()));
    }

    #[test]
    fn test_parse() {
        assert_eq!(PostalPrefix::parse(" 6211 ").unwrap().as_str(), "6211");
        assert!(PostalPrefix::parse("62111").is_err());
        assert!(PostalPrefix::parse("").is_err());
    }
}
