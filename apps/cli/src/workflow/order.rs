//! # Order Placement
//!
//! Turns an operator's selection into a persisted order.
//!
//! ## Stages
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SELECTING_CUSTOMER ──► SELECTING_ITEMS ──► COMPUTING_DISCOUNTS         │
//! │     customer exists      products priced      loyalty → birthday        │
//! │                          code exists, unused   → code                   │
//! │                                                     │                   │
//! │          ┌──────────────────────────────────────────┘                   │
//! │          ▼                                                              │
//! │  ASSIGNING_COURIER ──► PERSISTING ──► CONFIRMED                         │
//! │   ┌─── one transaction ───────────┐                                     │
//! │   │ release cooled-down couriers  │                                     │
//! │   │ claim first eligible courier  │                                     │
//! │   │ insert order + items          │                                     │
//! │   │ bump pizza count              │                                     │
//! │   │ consume discount code         │                                     │
//! │   └───────────────────────────────┘                                     │
//! │                                                                         │
//! │  Any failure ──► ABORTED (transaction rolled back, nothing written)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::workflow::{finish, local_date, store_time};
use pizza_core::courier::{rank_couriers, select_courier};
use pizza_core::pricing::{price_order, CodeDiscount, DiscountContext, PriceBreakdown, PricedLine};
use pizza_core::validation::{normalize_discount_code, validate_id, validate_quantity};
use pizza_core::{CoreError, Customer, DeliveryPerson, DiscountCode, Order};
use pizza_db::{
    CourierRepository, CustomerRepository, Database, DbConnection, DbError, DiscountCodeRepository,
    NewOrder, OrderRepository,
};

// =============================================================================
// Request / Response
// =============================================================================

/// One line as entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// Everything needed to place an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRequest {
    pub customer_id: i64,
    pub lines: Vec<OrderLine>,
    /// Raw code as typed; blank means none.
    pub discount_code: Option<String>,
}

/// A placed order with everything the console prints about it.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub order: Order,
    pub customer_name: String,
    pub courier: DeliveryPerson,
    pub lines: Vec<PricedLine>,
    pub breakdown: PriceBreakdown,
}

// =============================================================================
// Stages
// =============================================================================

/// Where an order is in the placement workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStage {
    SelectingCustomer,
    SelectingItems,
    ComputingDiscounts,
    AssigningCourier,
    Persisting,
    Confirmed,
    Aborted,
}

impl OrderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStage::SelectingCustomer => "SELECTING_CUSTOMER",
            OrderStage::SelectingItems => "SELECTING_ITEMS",
            OrderStage::ComputingDiscounts => "COMPUTING_DISCOUNTS",
            OrderStage::AssigningCourier => "ASSIGNING_COURIER",
            OrderStage::Persisting => "PERSISTING",
            OrderStage::Confirmed => "CONFIRMED",
            OrderStage::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStage::Confirmed | OrderStage::Aborted)
    }
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs stage transitions for one placement.
#[derive(Debug)]
pub(crate) struct StageLog {
    stage: OrderStage,
}

impl StageLog {
    pub(crate) fn start() -> Self {
        debug!(stage = %OrderStage::SelectingCustomer, "Order placement started");
        StageLog {
            stage: OrderStage::SelectingCustomer,
        }
    }

    pub(crate) fn advance(&mut self, next: OrderStage) {
        info!(from = %self.stage, to = %next, "Order stage");
        self.stage = next;
    }

    fn abort(&mut self, err: &AppError) {
        warn!(stage = %self.stage, error = %err, "Order aborted");
        self.stage = OrderStage::Aborted;
    }

    #[cfg(test)]
    pub(crate) fn stage(&self) -> OrderStage {
        self.stage
    }
}

// =============================================================================
// Workflow
// =============================================================================

/// Places an order at `now`, with the shop's local date as "today".
pub async fn place_order(
    db: &Database,
    request: &OrderRequest,
    now: DateTime<Utc>,
) -> Result<OrderConfirmation, AppError> {
    place_order_on(db, request, now, local_date(now)).await
}

/// Places an order at `now`; `today` decides the birthday discount.
///
/// Validation and lookups run before the transaction opens, so a rejected
/// order never touches the store. Courier assignment and all writes share
/// one transaction.
pub async fn place_order_on(
    db: &Database,
    request: &OrderRequest,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<OrderConfirmation, AppError> {
    let now = store_time(now);
    let mut stages = StageLog::start();

    match run(db, request, now, today, &mut stages).await {
        Ok(confirmation) => {
            stages.advance(OrderStage::Confirmed);
            info!(
                order_id = confirmation.order.id,
                courier_id = confirmation.courier.id,
                total = %confirmation.breakdown.final_total,
                "Order confirmed"
            );
            Ok(confirmation)
        }
        Err(err) => {
            stages.abort(&err);
            Err(err)
        }
    }
}

async fn run(
    db: &Database,
    request: &OrderRequest,
    now: DateTime<Utc>,
    today: NaiveDate,
    stages: &mut StageLog,
) -> Result<OrderConfirmation, AppError> {
    // SELECTING_CUSTOMER
    validate_id("customer id", request.customer_id)?;
    let customer = db
        .customers()
        .get_by_id(request.customer_id)
        .await?
        .ok_or(CoreError::CustomerNotFound(request.customer_id))?;

    // SELECTING_ITEMS
    stages.advance(OrderStage::SelectingItems);
    let lines = priced_lines(db, &merge_lines(&request.lines)?).await?;
    let code = lookup_code(db, request.discount_code.as_deref()).await?;

    // COMPUTING_DISCOUNTS
    stages.advance(OrderStage::ComputingDiscounts);
    let context = DiscountContext {
        prior_pizza_count: customer.pizza_count,
        is_birthday: customer.has_birthday_on(today),
        code: code.as_ref().map(|c| CodeDiscount {
            code: c.code.clone(),
            percent: c.percent_off(),
        }),
    };
    let breakdown = price_order(&lines, &context)?;
    debug!(
        base = %breakdown.base_total,
        discounts = breakdown.discounts.len(),
        total = %breakdown.final_total,
        "Order priced"
    );

    let (order, courier) = persist(db, &customer, &lines, &breakdown, code.as_ref(), now, stages).await?;

    Ok(OrderConfirmation {
        order,
        customer_name: customer.name,
        courier,
        lines,
        breakdown,
    })
}

/// Folds repeated products into one line each, keeping first-seen order.
fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, AppError> {
    if lines.is_empty() {
        return Err(CoreError::EmptyOrder.into());
    }

    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        validate_id("product id", line.product_id)?;
        validate_quantity(line.quantity)?;

        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(*line),
        }
    }

    for line in &merged {
        validate_quantity(line.quantity)?;
    }
    Ok(merged)
}

async fn priced_lines(db: &Database, lines: &[OrderLine]) -> Result<Vec<PricedLine>, AppError> {
    let products = db.products();
    let mut priced = Vec::with_capacity(lines.len());

    for line in lines {
        match products.priced(line.product_id).await? {
            Some(product) => priced.push(PricedLine::from_product(&product, line.quantity)),
            None if products.exists(line.product_id).await? => {
                return Err(CoreError::PriceMissing(line.product_id).into())
            }
            None => return Err(CoreError::ProductNotFound(line.product_id).into()),
        }
    }

    Ok(priced)
}

/// Resolves the typed code. Blank input means no code.
async fn lookup_code(db: &Database, raw: Option<&str>) -> Result<Option<DiscountCode>, AppError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };

    let code = normalize_discount_code(raw)?;
    let found = db
        .discount_codes()
        .find_by_code(&code)
        .await?
        .ok_or_else(|| CoreError::DiscountCodeNotFound(code.clone()))?;

    if found.is_used {
        return Err(CoreError::DiscountCodeUsed(found.code).into());
    }
    Ok(Some(found))
}

/// Assigns a courier and writes the order, all in one transaction.
pub(crate) async fn persist(
    db: &Database,
    customer: &Customer,
    lines: &[PricedLine],
    breakdown: &PriceBreakdown,
    code: Option<&DiscountCode>,
    now: DateTime<Utc>,
    stages: &mut StageLog,
) -> Result<(Order, DeliveryPerson), AppError> {
    let mut tx = db.begin().await?;
    let outcome = write_order(&mut tx, customer, lines, breakdown, code, now, stages).await;
    finish(tx, outcome).await
}

async fn write_order(
    conn: &mut DbConnection,
    customer: &Customer,
    lines: &[PricedLine],
    breakdown: &PriceBreakdown,
    code: Option<&DiscountCode>,
    now: DateTime<Utc>,
    stages: &mut StageLog,
) -> Result<(Order, DeliveryPerson), AppError> {
    // ASSIGNING_COURIER
    stages.advance(OrderStage::AssigningCourier);
    CourierRepository::release_cooled_down(conn, now).await?;
    let candidates = CourierRepository::load_candidates(conn).await?;
    let prefix = customer.postal_prefix();

    let preferred =
        select_courier(&candidates, prefix.as_ref(), now).ok_or(CoreError::NoEligibleCourier)?;
    debug!(courier_id = preferred.id, "Preferred courier");

    let mut courier = None;
    for candidate in rank_couriers(&candidates, prefix.as_ref(), now) {
        if CourierRepository::claim(conn, candidate.id, now).await? {
            courier = Some(DeliveryPerson {
                id: candidate.id,
                name: candidate.name.clone(),
                is_available: false,
            });
            break;
        }
        debug!(courier_id = candidate.id, "Courier taken concurrently, trying next");
    }
    let courier = courier.ok_or(CoreError::NoEligibleCourier)?;
    debug!(
        courier_id = courier.id,
        prefix = prefix.as_ref().map(|p| p.as_str()).unwrap_or("-"),
        "Courier assigned"
    );

    // PERSISTING
    stages.advance(OrderStage::Persisting);
    let order_id = OrderRepository::insert(
        conn,
        &NewOrder {
            customer_id: customer.id,
            delivery_person_id: courier.id,
            discount_code_id: code.map(|c| c.id),
            total_cents: breakdown.final_total.cents(),
            created_at: now,
        },
    )
    .await?;

    for line in lines {
        OrderRepository::insert_item(conn, order_id, line.product_id, line.quantity).await?;
    }

    CustomerRepository::add_pizzas(conn, customer.id, breakdown.pizza_units).await?;

    if let Some(code) = code.filter(|_| breakdown.consumes_code) {
        if !DiscountCodeRepository::consume(conn, code.id).await? {
            return Err(CoreError::DiscountCodeUsed(code.code.clone()).into());
        }
    }

    let order = OrderRepository::fetch(conn, order_id)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))?;

    Ok((order, courier))
}

// =============================================================================
// Unit Tests
// =============================================================================
