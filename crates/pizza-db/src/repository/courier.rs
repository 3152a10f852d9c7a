//! # Courier Repository
//!
//! Delivery people, their postal coverage, and the two availability writes
//! the ordering workflow relies on.
//!
//! ## Claim Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inside the order transaction                                           │
//! │                                                                         │
//! │  1. release_cooled_down(now)    flag back on for idle, cooled couriers  │
//! │  2. load_candidates()           availability + activity + coverage      │
//! │  3. rank_couriers(...)          pure ranking in pizza-core              │
//! │  4. claim(id, now)              conditional UPDATE, first success wins  │
//! │                                                                         │
//! │  claim() re-states the whole eligibility predicate in its WHERE clause, │
//! │  so a courier grabbed by another process between 2 and 4 simply         │
//! │  yields rows_affected = 0 and the next candidate is tried.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use pizza_core::courier::{cooldown, CourierCandidate};
use pizza_core::{DeliveryPerson, PostalPrefix};

/// Candidate row before coverage is attached.
#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    name: String,
    is_available: bool,
    last_delivered_at: Option<DateTime<Utc>>,
    active_orders: i64,
}

/// Repository for delivery people.
#[derive(Debug, Clone)]
pub struct CourierRepository {
    pool: SqlitePool,
}

impl CourierRepository {
    /// Creates a new CourierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CourierRepository { pool }
    }

    /// Inserts a courier and returns it.
    pub async fn insert(&self, name: &str, is_available: bool) -> DbResult<DeliveryPerson> {
        let courier = sqlx::query_as::<_, DeliveryPerson>(
            r#"
            INSERT INTO delivery_person (name, is_available)
            VALUES (?1, ?2)
            RETURNING id, name, is_available
            "#,
        )
        .bind(name)
        .bind(is_available)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = courier.id, name = %courier.name, "Inserted courier");
        Ok(courier)
    }

    /// Adds a postal prefix to a courier's coverage. Adding it twice is a no-op.
    pub async fn add_area(&self, courier_id: i64, prefix: &PostalPrefix) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO delivery_person_postal (delivery_person_id, postal_prefix)
            VALUES (?1, ?2)
            "#,
        )
        .bind(courier_id)
        .bind(prefix.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a courier by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<DeliveryPerson>> {
        let courier = sqlx::query_as::<_, DeliveryPerson>(
            "SELECT id, name, is_available FROM delivery_person WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(courier)
    }

    /// Lists every courier ordered by id.
    pub async fn list(&self) -> DbResult<Vec<DeliveryPerson>> {
        let couriers = sqlx::query_as::<_, DeliveryPerson>(
            "SELECT id, name, is_available FROM delivery_person ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(couriers)
    }

    /// Candidates as seen right now, outside any transaction.
    pub async fn candidates(&self) -> DbResult<Vec<CourierCandidate>> {
        let mut conn = self.pool.acquire().await?;
        Self::load_candidates(&mut conn).await
    }

    // =========================================================================
    // Transaction-level operations
    // =========================================================================

    /// Loads every courier with the facts the eligibility rule needs.
    pub async fn load_candidates(conn: &mut SqliteConnection) -> DbResult<Vec<CourierCandidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT
                d.id,
                d.name,
                d.is_available,
                (SELECT MAX(o.delivered_at)
                   FROM orders o
                  WHERE o.delivery_person_id = d.id) AS last_delivered_at,
                (SELECT COUNT(*)
                   FROM orders o
                   JOIN status s ON s.id = o.status_id
                  WHERE o.delivery_person_id = d.id
                    AND s.code <> 'DELIVERED') AS active_orders
            FROM delivery_person d
            ORDER BY d.id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let areas: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT delivery_person_id, postal_prefix
            FROM delivery_person_postal
            ORDER BY delivery_person_id, postal_prefix
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut coverage: HashMap<i64, Vec<PostalPrefix>> = HashMap::new();
        for (courier_id, raw) in areas {
            let prefix = PostalPrefix::parse(&raw).map_err(|e| {
                DbError::DataCorruption(format!("courier {courier_id} area '{raw}': {e}"))
            })?;
            coverage.entry(courier_id).or_default().push(prefix);
        }

        let candidates: Vec<CourierCandidate> = rows
            .into_iter()
            .map(|row| CourierCandidate {
                postal_prefixes: coverage.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                is_available: row.is_available,
                last_delivered_at: row.last_delivered_at,
                active_orders: row.active_orders,
            })
            .collect();

        debug!(count = candidates.len(), "Loaded courier candidates");
        Ok(candidates)
    }

    /// Atomically takes a courier off the available list if still eligible.
    ///
    /// Returns `false` when the courier is unavailable, has an active order,
    /// or delivered something within the cooldown before `now`.
    pub async fn claim(conn: &mut SqliteConnection, courier_id: i64, now: DateTime<Utc>) -> DbResult<bool> {
        let cutoff = now - cooldown();

        let result = sqlx::query(
            r#"
            UPDATE delivery_person
               SET is_available = 0
             WHERE id = ?1
               AND is_available = 1
               AND NOT EXISTS (
                     SELECT 1 FROM orders o
                     JOIN status s ON s.id = o.status_id
                     WHERE o.delivery_person_id = ?1
                       AND s.code <> 'DELIVERED')
               AND NOT EXISTS (
                     SELECT 1 FROM orders o
                     WHERE o.delivery_person_id = ?1
                       AND o.delivered_at > ?2)
            "#,
        )
        .bind(courier_id)
        .bind(cutoff)
        .execute(&mut *conn)
        .await?;

        let claimed = result.rows_affected() == 1;
        debug!(courier_id, claimed, "Courier claim attempted");
        Ok(claimed)
    }

    /// Turns the availability flag back on for couriers that finished their
    /// last delivery at least one cooldown before `now` and have nothing
    /// else in flight.
    ///
    /// Couriers without any order are off duty and are never touched.
    /// Returns the number of couriers released.
    pub async fn release_cooled_down(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<u64> {
        let cutoff = now - cooldown();

        let result = sqlx::query(
            r#"
            UPDATE delivery_person
               SET is_available = 1
             WHERE is_available = 0
               AND EXISTS (
                     SELECT 1 FROM orders o
                     WHERE o.delivery_person_id = delivery_person.id)
               AND NOT EXISTS (
                     SELECT 1 FROM orders o
                     JOIN status s ON s.id = o.status_id
                     WHERE o.delivery_person_id = delivery_person.id
                       AND s.code <> 'DELIVERED')
               AND NOT EXISTS (
                     SELECT 1 FROM orders o
                     WHERE o.delivery_person_id = delivery_person.id
                       AND o.delivered_at > ?1)
            "#,
        )
        .bind(cutoff)
        .execute(&mut *conn)
        .await?;

        let released = result.rows_affected();
        if released > 0 {
            info!(released, "Couriers back in rotation after cooldown");
        }
        Ok(released)
    }

    /// Number of the courier's orders that are not yet delivered.
    pub async fn active_orders(conn: &mut SqliteConnection, courier_id: i64) -> DbResult<i64> {
        let count = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM orders o
            JOIN status s ON s.id = o.status_id
            WHERE o.delivery_person_id = ?1
              AND s.code <> 'DELIVERED'
            "#,
        )
        .bind(courier_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }

    /// Sets the availability flag unconditionally.
    pub async fn set_available(conn: &mut SqliteConnection, courier_id: i64, available: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE delivery_person SET is_available = ?2 WHERE id = ?1")
            .bind(courier_id)
            .bind(available)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Courier", courier_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::order::NewOrder;
    use crate::repository::OrderRepository;
    use crate::{Database, DbConfig};
    use chrono::{Duration, NaiveDate, TimeZone};
    use pizza_core::NewCustomer;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 19, 0, 0).unwrap()
    }

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.initialize().await.unwrap();
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Anna".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                address: "Grote Gracht 12, 6211 SZ Maastricht".to_string(),
                phone: "0612345678".to_string(),
            })
            .await
            .unwrap();
        (db, customer.id)
    }

    /// Places an order for `courier_id` and optionally delivers it at `delivered_at`.
    async fn order_for(db: &Database, customer_id: i64, courier_id: i64, delivered_at: Option<DateTime<Utc>>) {
        let mut tx = db.begin().await.unwrap();
        let order_id = OrderRepository::insert(
            &mut tx,
            &NewOrder {
                customer_id,
                delivery_person_id: courier_id,
                discount_code_id: None,
                total_cents: 1000,
                created_at: now() - Duration::hours(2),
            },
        )
        .await
        .unwrap();
        if let Some(at) = delivered_at {
            assert!(OrderRepository::mark_delivered(&mut tx, order_id, at).await.unwrap());
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_load_candidates_with_coverage() {
        let (db, _) = setup().await;
        let a = db.couriers().insert("Alex", true).await.unwrap();
        let b = db.couriers().insert("Bo", true).await.unwrap();
        db.couriers().add_area(a.id, &PostalPrefix::parse("6211").unwrap()).await.unwrap();
        db.couriers().add_area(a.id, &PostalPrefix::parse("6229").unwrap()).await.unwrap();
        db.couriers().add_area(a.id, &PostalPrefix::parse("6229").unwrap()).await.unwrap();

        let candidates = db.couriers().candidates().await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].postal_prefixes.len(), 2);
        assert!(candidates[1].postal_prefixes.is_empty());
        assert_eq!(candidates[1].id, b.id);
        assert_eq!(candidates[0].active_orders, 0);
        assert!(candidates[0].last_delivered_at.is_none());
    }

    #[tokio::test]
    async fn test_candidate_activity_facts() {
        let (db, customer_id) = setup().await;
        let c = db.couriers().insert("Alex", true).await.unwrap();
        let delivered = now() - Duration::minutes(45);
        order_for(&db, customer_id, c.id, Some(delivered)).await;
        order_for(&db, customer_id, c.id, None).await;

        let candidates = db.couriers().candidates().await.unwrap();
        assert_eq!(candidates[0].active_orders, 1);
        assert_eq!(candidates[0].last_delivered_at, Some(delivered));
    }

    #[tokio::test]
    async fn test_claim_takes_courier_once() {
        let (db, _) = setup().await;
        let c = db.couriers().insert("Alex", true).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(CourierRepository::claim(&mut tx, c.id, now()).await.unwrap());
        assert!(!CourierRepository::claim(&mut tx, c.id, now()).await.unwrap());
        tx.commit().await.unwrap();

        assert!(!db.couriers().get_by_id(c.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_claim_respects_cooldown_and_active_orders() {
        let (db, customer_id) = setup().await;
        let cooling = db.couriers().insert("Cooling", true).await.unwrap();
        let busy = db.couriers().insert("Busy", true).await.unwrap();
        let rested = db.couriers().insert("Rested", true).await.unwrap();

        order_for(&db, customer_id, cooling.id, Some(now() - Duration::minutes(10))).await;
        order_for(&db, customer_id, busy.id, None).await;
        order_for(&db, customer_id, rested.id, Some(now() - Duration::minutes(30))).await;

        let mut tx = db.begin().await.unwrap();
        assert!(!CourierRepository::claim(&mut tx, cooling.id, now()).await.unwrap());
        assert!(!CourierRepository::claim(&mut tx, busy.id, now()).await.unwrap());
        assert!(CourierRepository::claim(&mut tx, rested.id, now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_cooled_down() {
        let (db, customer_id) = setup().await;
        let off_duty = db.couriers().insert("Off duty", false).await.unwrap();
        let cooled = db.couriers().insert("Cooled", true).await.unwrap();
        let cooling = db.couriers().insert("Cooling", true).await.unwrap();

        order_for(&db, customer_id, cooled.id, Some(now() - Duration::minutes(40))).await;
        order_for(&db, customer_id, cooling.id, Some(now() - Duration::minutes(5))).await;

        // Assignment takes couriers off the list
        let mut tx = db.begin().await.unwrap();
        CourierRepository::set_available(&mut tx, cooled.id, false).await.unwrap();
        CourierRepository::set_available(&mut tx, cooling.id, false).await.unwrap();
        let released = CourierRepository::release_cooled_down(&mut tx, now()).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(released, 1);
        assert!(db.couriers().get_by_id(cooled.id).await.unwrap().unwrap().is_available);
        assert!(!db.couriers().get_by_id(cooling.id).await.unwrap().unwrap().is_available);
        assert!(!db.couriers().get_by_id(off_duty.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_set_available_unknown_courier() {
        let (db, _) = setup().await;
        let mut tx = db.begin().await.unwrap();
        let err = CourierRepository::set_available(&mut tx, 99, true).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
