//! # Money Module
//!
//! Euro amounts as whole cents.
//!
//! The discount chain subtracts several amounts in a row (loyalty, birthday
//! pizza, birthday drink, code). With floats `18.90 - 8.00` already comes out
//! as `10.899999999999999`; with cents it is `1890 - 800 = 1090`. Percentages
//! are rounded to a whole cent once, at the step that applies them.
//!
//! ## Usage
//! ```rust
//! use pizza_core::money::Money;
//!
//! let price = Money::from_cents(800); // €8.00
//! let doubled = price * 2;            // €16.00
//! let total = doubled + Money::from_cents(300); // €19.00
//! assert_eq!(total.to_string(), "€19.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in euro cents.
///
/// Signed, since applied discounts are carried as negative amounts.
///
/// ## Where Money is Used
/// ```text
/// v_product_prices.final_price_cents ──► PricedLine.unit_price
///                                              │
///                                              ▼
///                  PriceBreakdown.base_total ──► discounts ──► final_total
///                                                                  │
///                                                                  ▼
///                                                      orders.total_cents
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use pizza_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents €10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-euro portion (truncated toward zero).
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn max_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use pizza_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `pct` percent of this amount, rounded to a whole cent.
    ///
    /// ## Rounding
    /// Half away from zero: `(amount × pct ± 50) / 100`.
    /// i128 keeps the intermediate product from overflowing.
    ///
    /// ## Example
    /// ```rust
    /// use pizza_core::money::Money;
    ///
    /// let total = Money::from_cents(1005); // €10.05
    /// // 10% of €10.05 = €1.005 → €1.01
    /// assert_eq!(total.percent(10).cents(), 101);
    /// ```
    pub fn percent(&self, pct: u32) -> Money {
        let scaled = self.0 as i128 * pct as i128;
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Money::from_cents(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as euros with two decimals, e.g. `€8.00` or `-€2.10`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}€{}.{:02}", sign, self.euros().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
