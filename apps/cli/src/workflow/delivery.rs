//! Delivery completion.
//!
//! Marks an order delivered and starts its courier's cooldown. A delivery
//! never puts the courier back into rotation: the next order placement after
//! the cooldown does that (see `CourierRepository::release_cooled_down`).

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::AppError;
use crate::workflow::{finish, store_time};
use pizza_core::courier::cooldown;
use pizza_core::validation::validate_id;
use pizza_core::{CoreError, Order};
use pizza_db::{CourierRepository, Database, DbConnection, DbError, OrderRepository};

/// What happened when an order was marked delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub order: Order,
    pub courier_id: i64,
    /// Orders still assigned to the courier and not yet delivered.
    pub active_orders: i64,
    /// Earliest moment the courier can be assigned again.
    pub available_from: DateTime<Utc>,
}

/// Marks `order_id` delivered at `now`.
pub async fn mark_delivered(
    db: &Database,
    order_id: i64,
    now: DateTime<Utc>,
) -> Result<DeliveryOutcome, AppError> {
    validate_id("order id", order_id)?;
    let now = store_time(now);

    let mut tx = db.begin().await?;
    let outcome = complete(&mut tx, order_id, now).await;
    let outcome = finish(tx, outcome).await?;

    info!(
        order_id,
        courier_id = outcome.courier_id,
        available_from = %outcome.available_from,
        "Order delivered"
    );
    Ok(outcome)
}

async fn complete(
    conn: &mut DbConnection,
    order_id: i64,
    now: DateTime<Utc>,
) -> Result<DeliveryOutcome, AppError> {
    let order = OrderRepository::fetch(conn, order_id)
        .await?
        .ok_or(CoreError::OrderNotFound(order_id))?;

    if order.status.is_delivered() {
        return Err(CoreError::OrderAlreadyDelivered(order_id).into());
    }

    // Guarded by status, so a concurrent delivery loses here
    if !OrderRepository::mark_delivered(conn, order_id, now).await? {
        return Err(CoreError::OrderAlreadyDelivered(order_id).into());
    }

    let courier_id = order.delivery_person_id;
    // The cooldown starts now, so the courier stays out of rotation
    CourierRepository::set_available(conn, courier_id, false).await?;
    let active_orders = CourierRepository::active_orders(conn, courier_id).await?;
    let available_from = now + cooldown();
    debug!(courier_id, active_orders, %available_from, "Courier cooling down");

    let order = OrderRepository::fetch(conn, order_id)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))?;

    Ok(DeliveryOutcome {
        order,
        courier_id,
        active_orders,
        available_from,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
