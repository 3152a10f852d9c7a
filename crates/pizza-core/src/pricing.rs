//! # Pricing & Discounts
//!
//! Computes what an order costs.
//!
//! ## Discount Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base = Σ unit_price × quantity                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. LOYALTY   prior pizza count ≥ 10  →  − round(10% of running)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. BIRTHDAY  month/day match         →  − cheapest pizza unit price   │
//! │       │                                  − cheapest drink unit price   │
//! │       ▼                                                                 │
//! │  3. CODE      valid unused code       →  − round(code% of running)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  final = max(running, 0)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step sees the running total left by the previous step, and each
//! deduction is rounded to a whole cent on its own before it is subtracted.
//!
//! ## Worked Example
//! ```rust
//! use pizza_core::money::Money;
//! use pizza_core::pricing::{price_order, DiscountContext, PricedLine};
//! use pizza_core::ProductCategory;
//!
//! let lines = vec![
//!     PricedLine::new(1, "Margherita", ProductCategory::Pizza, Money::from_cents(800), 1),
//!     PricedLine::new(2, "Diavola", ProductCategory::Pizza, Money::from_cents(1000), 1),
//!     PricedLine::new(3, "Cola", ProductCategory::Drink, Money::from_cents(300), 1),
//! ];
//! let ctx = DiscountContext { prior_pizza_count: 12, is_birthday: true, code: None };
//!
//! let breakdown = price_order(&lines, &ctx).unwrap();
//! assert_eq!(breakdown.base_total.cents(), 2100);
//! assert_eq!(breakdown.final_total.cents(), 790);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PricedProduct, ProductCategory};
use crate::validation::validate_quantity;
use crate::{LOYALTY_PERCENT, LOYALTY_THRESHOLD};

// =============================================================================
// Inputs
// =============================================================================

/// One product line with its menu price frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: i64,
    pub name: String,
    pub category: ProductCategory,
    pub unit_price: Money,
    pub quantity: i64,
}

impl PricedLine {
    pub fn new(
        product_id: i64,
        name: impl Into<String>,
        category: ProductCategory,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        PricedLine {
            product_id,
            name: name.into(),
            category,
            unit_price,
            quantity,
        }
    }

    /// Builds a line from a priced view row.
    pub fn from_product(product: &PricedProduct, quantity: i64) -> Self {
        PricedLine::new(
            product.id,
            product.name.clone(),
            product.category(),
            product.price(),
            quantity,
        )
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A discount code that has already been checked to exist and be unused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDiscount {
    pub code: String,
    pub percent: u32,
}

/// Customer facts the discount rules depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountContext {
    /// Pizza count before this order.
    pub prior_pizza_count: i64,
    pub is_birthday: bool,
    pub code: Option<CodeDiscount>,
}

// =============================================================================
// Outputs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Loyalty,
    BirthdayPizza,
    BirthdayDrink,
    Code,
}

/// A discount as shown on the order summary. `amount` is negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub kind: DiscountKind,
    pub label: String,
    pub amount: Money,
}

/// Result of pricing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_total: Money,
    /// In application order: loyalty, birthday pizza, birthday drink, code.
    pub discounts: Vec<AppliedDiscount>,
    pub final_total: Money,
    /// Pizza units in this order; added to the customer's pizza count.
    pub pizza_units: i64,
    /// True when a code discount was applied and must be marked used.
    pub consumes_code: bool,
}

impl PriceBreakdown {
    /// Sum of all deductions as a positive amount.
    pub fn total_discount(&self) -> Money {
        -self.discounts.iter().map(|d| d.amount).sum::<Money>()
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Prices an order and applies the discount chain.
///
/// ## Errors
/// - `EmptyOrder` when `lines` is empty
/// - `Validation` when a quantity is not in 1..=999
pub fn price_order(lines: &[PricedLine], ctx: &DiscountContext) -> CoreResult<PriceBreakdown> {
    if lines.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    for line in lines {
        validate_quantity(line.quantity)?;
    }

    let base_total: Money = lines.iter().map(PricedLine::line_total).sum();
    let pizza_units: i64 = lines
        .iter()
        .filter(|l| l.category == ProductCategory::Pizza)
        .map(|l| l.quantity)
        .sum();

    let mut running = base_total;
    let mut discounts = Vec::new();

    if ctx.prior_pizza_count >= LOYALTY_THRESHOLD {
        let amount = running.percent(LOYALTY_PERCENT);
        running -= amount;
        discounts.push(AppliedDiscount {
            kind: DiscountKind::Loyalty,
            label: format!("Loyalty discount ({}%)", LOYALTY_PERCENT),
            amount: -amount,
        });
    }

    if ctx.is_birthday {
        if let Some(pizza) = cheapest(lines, ProductCategory::Pizza) {
            running -= pizza.unit_price;
            discounts.push(AppliedDiscount {
                kind: DiscountKind::BirthdayPizza,
                label: format!("Birthday: free {}", pizza.name),
                amount: -pizza.unit_price,
            });
        }
        if let Some(drink) = cheapest(lines, ProductCategory::Drink) {
            running -= drink.unit_price;
            discounts.push(AppliedDiscount {
                kind: DiscountKind::BirthdayDrink,
                label: format!("Birthday: free {}", drink.name),
                amount: -drink.unit_price,
            });
        }
    }

    let consumes_code = ctx.code.is_some();
    if let Some(code) = &ctx.code {
        // A birthday can already push the running total below zero
        let amount = running.max_zero().percent(code.percent);
        running -= amount;
        discounts.push(AppliedDiscount {
            kind: DiscountKind::Code,
            label: format!("Code {} ({}%)", code.code, code.percent),
            amount: -amount,
        });
    }

    Ok(PriceBreakdown {
        base_total,
        discounts,
        final_total: running.max_zero(),
        pizza_units,
        consumes_code,
    })
}

/// Line with the lowest unit price in a category. Ties keep the first line.
fn cheapest(lines: &[PricedLine], category: ProductCategory) -> Option<&PricedLine> {
    lines
        .iter()
        .filter(|l| l.category == category)
        .min_by_key(|l| l.unit_price)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza(id: i64, cents: i64, qty: i64) -> PricedLine {
        PricedLine::new(id, format!("Pizza {}", id), ProductCategory::Pizza, Money::from_cents(cents), qty)
    }

    fn drink(id: i64, cents: i64, qty: i64) -> PricedLine {
        PricedLine::new(id, format!("Drink {}", id), ProductCategory::Drink, Money::from_cents(cents), qty)
    }

    fn dessert(id: i64, cents: i64, qty: i64) -> PricedLine {
        PricedLine::new(id, format!("Dessert {}", id), ProductCategory::Dessert, Money::from_cents(cents), qty)
    }

    fn code(pct: u32) -> Option<CodeDiscount> {
        Some(CodeDiscount {
            code: "SAVE".to_string(),
            percent: pct,
        })
    }

    #[test]
    fn test_no_discounts() {
        let lines = vec![pizza(1, 850, 2), drink(2, 250, 1)];
        let b = price_order(&lines, &DiscountContext::default()).unwrap();

        assert_eq!(b.base_total.cents(), 1950);
        assert_eq!(b.final_total.cents(), 1950);
        assert!(b.discounts.is_empty());
        assert_eq!(b.pizza_units, 2);
        assert!(!b.consumes_code);
    }

    #[test]
    fn test_loyal_birthday_customer_example() {
        let lines = vec![pizza(1, 800, 1), pizza(2, 1000, 1), drink(3, 300, 1)];
        let ctx = DiscountContext {
            prior_pizza_count: 12,
            is_birthday: true,
            code: None,
        };
        let b = price_order(&lines, &ctx).unwrap();

        assert_eq!(b.base_total.cents(), 2100);
        let amounts: Vec<i64> = b.discounts.iter().map(|d| d.amount.cents()).collect();
        assert_eq!(amounts, vec![-210, -800, -300]);
        let kinds: Vec<DiscountKind> = b.discounts.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiscountKind::Loyalty,
                DiscountKind::BirthdayPizza,
                DiscountKind::BirthdayDrink
            ]
        );
        assert_eq!(b.final_total.cents(), 790);
        assert_eq!(b.pizza_units, 2);
    }

    #[test]
    fn test_loyalty_threshold_is_inclusive() {
        let lines = vec![pizza(1, 1000, 1)];
        let below = DiscountContext {
            prior_pizza_count: 9,
            ..Default::default()
        };
        let at = DiscountContext {
            prior_pizza_count: 10,
            ..Default::default()
        };

        assert_eq!(price_order(&lines, &below).unwrap().final_total.cents(), 1000);
        assert_eq!(price_order(&lines, &at).unwrap().final_total.cents(), 900);
    }

    #[test]
    fn test_code_applies_after_loyalty() {
        // 1999 → loyalty 200 (199.9 rounded) → 1799 → 15% = 269.85 → 270 → 1529
        let lines = vec![pizza(1, 1999, 1)];
        let ctx = DiscountContext {
            prior_pizza_count: 10,
            is_birthday: false,
            code: code(15),
        };
        let b = price_order(&lines, &ctx).unwrap();

        assert_eq!(b.discounts[0].amount.cents(), -200);
        assert_eq!(b.discounts[1].amount.cents(), -270);
        assert_eq!(b.final_total.cents(), 1529);
        assert!(b.consumes_code);
    }

    #[test]
    fn test_birthday_only_cheapest_unit_not_whole_line() {
        // Two units of the cheap pizza: only one unit is free
        let lines = vec![pizza(1, 900, 1), pizza(2, 700, 2)];
        let ctx = DiscountContext {
            is_birthday: true,
            ..Default::default()
        };
        let b = price_order(&lines, &ctx).unwrap();

        assert_eq!(b.base_total.cents(), 2300);
        assert_eq!(b.discounts.len(), 1);
        assert_eq!(b.discounts[0].amount.cents(), -700);
        assert_eq!(b.final_total.cents(), 1600);
    }

    #[test]
    fn test_birthday_ignores_other_categories() {
        let lines = vec![dessert(1, 400, 1)];
        let ctx = DiscountContext {
            is_birthday: true,
            ..Default::default()
        };
        let b = price_order(&lines, &ctx).unwrap();

        assert!(b.discounts.is_empty());
        assert_eq!(b.final_total.cents(), 400);
        assert_eq!(b.pizza_units, 0);
    }

    #[test]
    fn test_final_total_never_negative() {
        // Loyalty makes the running total smaller than the free pizza price
        let lines = vec![pizza(1, 1000, 1)];
        let ctx = DiscountContext {
            prior_pizza_count: 50,
            is_birthday: true,
            code: code(50),
        };
        let b = price_order(&lines, &ctx).unwrap();

        // 1000 → -100 → 900 → -1000 → -100 → code on 0 → 0
        assert_eq!(b.discounts[2].amount.cents(), 0);
        assert_eq!(b.final_total, Money::zero());
    }

    #[test]
    fn test_final_equals_base_minus_deductions_when_positive() {
        let lines = vec![pizza(1, 1234, 3), drink(2, 199, 2), dessert(3, 555, 1)];
        let ctx = DiscountContext {
            prior_pizza_count: 11,
            is_birthday: true,
            code: code(7),
        };
        let b = price_order(&lines, &ctx).unwrap();

        assert!(!b.final_total.is_negative());
        assert_eq!(b.final_total, b.base_total - b.total_discount());
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = price_order(&[], &DiscountContext::default()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrder));
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let err = price_order(&[pizza(1, 800, 0)], &DiscountContext::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
