//! # Order Repository
//!
//! Orders and their items. All writes take an open connection so they can
//! be composed into the placement and delivery transactions; reads go
//! through the pool.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   insert() ──► CREATED ─────────────────────────► DELIVERED             │
//! │   (status_id,        │      mark_delivered(now)    (delivered_at = now) │
//! │    created_at)       │                                                   │
//! │                      └── insert_item() × n                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::status::StatusRepository;
use pizza_core::{Order, OrderItem, OrderStatus, OrderSummary};

const SELECT_ORDER: &str = r#"
    SELECT
        o.id,
        o.customer_id,
        o.delivery_person_id,
        o.discount_code_id,
        s.code AS status,
        o.total_cents,
        o.created_at,
        o.delivered_at
    FROM orders o
    JOIN status s ON s.id = o.status_id
"#;

/// Input for inserting an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub delivery_person_id: i64,
    pub discount_code_id: Option<i64>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Items of an order, by product id.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT order_id, product_id, quantity
            FROM order_item
            WHERE order_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Every order not yet delivered, oldest first.
    pub async fn undelivered(&self) -> DbResult<Vec<OrderSummary>> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id,
                c.name AS customer_name,
                d.name AS courier_name,
                s.code AS status,
                o.total_cents,
                o.created_at
            FROM orders o
            JOIN status s          ON s.id = o.status_id
            JOIN customer c        ON c.id = o.customer_id
            JOIN delivery_person d ON d.id = o.delivery_person_id
            WHERE s.code <> 'DELIVERED'
            ORDER BY o.created_at, o.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = orders.len(), "Loaded undelivered orders");
        Ok(orders)
    }

    /// Number of orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Transaction-level operations
    // =========================================================================

    /// Reads an order on an open connection.
    pub async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} WHERE o.id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(order)
    }

    /// Inserts an order in `CREATED` and returns its id.
    pub async fn insert(conn: &mut SqliteConnection, order: &NewOrder) -> DbResult<i64> {
        let status_id = StatusRepository::id_of(conn, OrderStatus::Created).await?;

        let id = sqlx::query_scalar(
            r#"
            INSERT INTO orders
                (customer_id, delivery_person_id, discount_code_id, status_id, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            "#,
        )
        .bind(order.customer_id)
        .bind(order.delivery_person_id)
        .bind(order.discount_code_id)
        .bind(status_id)
        .bind(order.total_cents)
        .bind(order.created_at)
        .fetch_one(&mut *conn)
        .await?;

        debug!(order_id = id, courier_id = order.delivery_person_id, "Inserted order");
        Ok(id)
    }

    /// Inserts one order line.
    pub async fn insert_item(
        conn: &mut SqliteConnection,
        order_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> DbResult<()> {
        sqlx::query("INSERT INTO order_item (order_id, product_id, quantity) VALUES (?1, ?2, ?3)")
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Moves an order to `DELIVERED` with `delivered_at = at`.
    ///
    /// Returns `false` when the order does not exist or is already delivered.
    pub async fn mark_delivered(conn: &mut SqliteConnection, order_id: i64, at: DateTime<Utc>) -> DbResult<bool> {
        let delivered_id = StatusRepository::id_of(conn, OrderStatus::Delivered).await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
               SET status_id = ?2, delivered_at = ?3
             WHERE id = ?1
               AND status_id <> ?2
            "#,
        )
        .bind(order_id)
        .bind(delivered_id)
        .bind(at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
