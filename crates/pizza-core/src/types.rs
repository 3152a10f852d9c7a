//! # Domain Types
//!
//! Core domain types used throughout the ordering system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Order       │   │ DeliveryPerson  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  customer_id    │   │  id             │       │
//! │  │  birth_date     │   │  courier_id     │──►│  is_available   │       │
//! │  │  address        │   │  status         │   │  (postal cover) │       │
//! │  │  pizza_count    │   │  total_cents    │   └─────────────────┘       │
//! │  └─────────────────┘   └────────┬────────┘                              │
//! │                                 │ 1..n                                  │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │  PricedProduct  │◄──│   OrderItem     │   │  DiscountCode   │       │
//! │  │  price_cents    │   │  quantity       │   │  percent        │       │
//! │  │  category       │   └─────────────────┘   │  is_used        │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by a database-assigned integer id.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::postal::PostalPrefix;

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    /// Free text; carries the postal code somewhere inside.
    pub address: String,
    pub phone: String,
    /// Pizza units ordered so far. Only ever grows.
    pub pizza_count: i64,
}

impl Customer {
    /// True when `today` has the same month and day as the birth date.
    ///
    /// A 29 February birthday only matches in leap years.
    pub fn has_birthday_on(&self, today: NaiveDate) -> bool {
        self.birth_date.month() == today.month() && self.birth_date.day() == today.day()
    }

    /// Postal prefix embedded in the address, if any.
    pub fn postal_prefix(&self) -> Option<PostalPrefix> {
        PostalPrefix::extract(&self.address)
    }
}

/// Input for registering a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub phone: String,
}

// =============================================================================
// Products
// =============================================================================

/// Product category, derived from the product type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Pizza,
    Drink,
    Dessert,
    Other,
}

impl ProductCategory {
    /// Maps a product type name to a category (case-insensitive).
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "pizza" => ProductCategory::Pizza,
            "drink" => ProductCategory::Drink,
            "dessert" => ProductCategory::Dessert,
            _ => ProductCategory::Other,
        }
    }
}

/// One row of the priced product view.
///
/// `price_cents` is the final menu price (cost plus margin and VAT),
/// computed by the database view, never by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PricedProduct {
    pub id: i64,
    pub name: String,
    /// Product type name as stored ("Pizza", "Drink", ...).
    pub type_name: String,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub price_cents: i64,
}

impl PricedProduct {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn category(&self) -> ProductCategory {
        ProductCategory::from_type_name(&self.type_name)
    }

    /// Menu suffix. Vegan wins over vegetarian.
    pub fn dietary_label(&self) -> &'static str {
        if self.is_vegan {
            " (vegan)"
        } else if self.is_vegetarian {
            " (vegetarian)"
        } else {
            ""
        }
    }
}

// =============================================================================
// Discount Code
// =============================================================================

/// A one-time discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DiscountCode {
    pub id: i64,
    pub code: String,
    /// Percentage off, 0-100 (enforced by a CHECK constraint).
    pub percent: i64,
    pub is_used: bool,
}

impl DiscountCode {
    /// Percentage clamped into 0..=100.
    pub fn percent_off(&self) -> u32 {
        self.percent.clamp(0, 100) as u32
    }
}

// =============================================================================
// Delivery Person
// =============================================================================

/// A courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryPerson {
    pub id: i64,
    pub name: String,
    pub is_available: bool,
}

// =============================================================================
// Order Status
// =============================================================================

/// Order lifecycle status.
///
/// ```text
/// CREATED ──► IN_PROGRESS ──► OUT_FOR_DELIVERY ──► DELIVERED
///    │                                                 ▲
///    └─────────────── mark delivered ──────────────────┘
/// ```
/// Only CREATED (at placement) and DELIVERED (at completion) are written
/// by the application today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    InProgress,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::InProgress,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// Code stored in the `status` table.
    pub const fn code(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// Inverse of [`OrderStatus::code`].
    pub fn from_code(code: &str) -> Option<Self> {
        OrderStatus::ALL.into_iter().find(|s| s.code() == code)
    }

    #[inline]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Created
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub delivery_person_id: i64,
    pub discount_code_id: Option<i64>,
    pub status: OrderStatus,
    /// Post-discount total, never negative.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Order joined with customer and courier names, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderSummary {
    pub id: i64,
    pub customer_name: String,
    pub courier_name: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderSummary {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(birth: NaiveDate, address: &str) -> Customer {
        Customer {
            id: 1,
            name: "Anna".to_string(),
            birth_date: birth,
            address: address.to_string(),
            phone: "0612345678".to_string(),
            pizza_count: 0,
        }
    }

    #[test]
    fn test_birthday_matches_month_and_day_only() {
        let c = customer(NaiveDate::from_ymd_opt(1990, 10, 16).unwrap(), "x");
        assert!(c.has_birthday_on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()));
        assert!(!c.has_birthday_on(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()));
        assert!(!c.has_birthday_on(NaiveDate::from_ymd_opt(2026, 11, 16).unwrap()));
    }

    #[test]
    fn test_leap_day_birthday() {
        let c = customer(NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(), "x");
        assert!(c.has_birthday_on(NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()));
        assert!(!c.has_birthday_on(NaiveDate::from_ymd_opt(2027, 2, 28).unwrap()));
    }

    #[test]
    fn test_customer_postal_prefix() {
        let c = customer(
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            "Grote Gracht 12, 6211 SZ Maastricht",
        );
        assert_eq!(c.postal_prefix().unwrap().as_str(), "6211");
    }

    #[test]
    fn test_category_from_type_name() {
        assert_eq!(ProductCategory::from_type_name("Pizza"), ProductCategory::Pizza);
        assert_eq!(ProductCategory::from_type_name(" drink "), ProductCategory::Drink);
        assert_eq!(ProductCategory::from_type_name("DESSERT"), ProductCategory::Dessert);
        assert_eq!(ProductCategory::from_type_name("Side"), ProductCategory::Other);
    }

    #[test]
    fn test_dietary_label_prefers_vegan() {
        let mut p = PricedProduct {
            id: 1,
            name: "Marinara".to_string(),
            type_name: "Pizza".to_string(),
            is_vegan: true,
            is_vegetarian: true,
            price_cents: 800,
        };
        assert_eq!(p.dietary_label(), " (vegan)");
        p.is_vegan = false;
        assert_eq!(p.dietary_label(), " (vegetarian)");
        p.is_vegetarian = false;
        assert_eq!(p.dietary_label(), "");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderStatus::OutForDelivery.code(), "OUT_FOR_DELIVERY");
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
        assert!(OrderStatus::Delivered.is_delivered());
        assert_eq!(OrderStatus::ALL.len(), 4);
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(OrderStatus::from_code("delivered"), None);
    }

    #[test]
    fn test_discount_percent_clamped() {
        let code = DiscountCode {
            id: 1,
            code: "X".to_string(),
            percent: 150,
            is_used: false,
        };
        assert_eq!(code.percent_off(), 100);
    }
}
