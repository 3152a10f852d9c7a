//! # Workflows
//!
//! The operations behind the console menu. Each one validates first,
//! then does all of its writes in a single transaction.
//!
//! ```text
//! ┌───────────────────────┬───────────────────────────────────────────────┐
//! │  Menu entry           │  Workflow                                     │
//! ├───────────────────────┼───────────────────────────────────────────────┤
//! │  2) Place order       │  order::place_order                           │
//! │  3) Add customer      │  customer::add_customer                       │
//! │  5) Mark delivered    │  delivery::mark_delivered                     │
//! └───────────────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! Every workflow takes `now` as an argument. Timestamps are truncated to
//! whole seconds before they reach the store.

pub mod customer;
pub mod delivery;
pub mod order;

use chrono::{DateTime, Local, NaiveDate, SubsecRound, TimeZone, Utc};
use tracing::error;

use crate::error::AppError;
use pizza_db::{DbError, DbTransaction};

pub use customer::{add_customer, list_customers};
pub use delivery::{mark_delivered, DeliveryOutcome};
pub use order::{
    place_order, place_order_on, OrderConfirmation, OrderLine, OrderRequest, OrderStage,
};

/// Drops sub-second precision so stored timestamps compare as text.
pub(crate) fn store_time(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(0)
}

/// Calendar date of `now` in the shop's time zone.
///
/// Birthdays and "not in the future" checks use this, not the UTC date.
pub fn local_date(now: DateTime<Utc>) -> NaiveDate {
    date_in(now, &Local)
}

pub(crate) fn date_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Commits on success, rolls back on failure, and returns the outcome.
pub(crate) async fn finish<T>(tx: DbTransaction, outcome: Result<T, AppError>) -> Result<T, AppError> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                error!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for workflow tests.

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use pizza_core::{Customer, NewCustomer, PostalPrefix};

    use crate::error::AppError;
    use crate::workflow::{place_order_on, OrderConfirmation, OrderRequest};
    use pizza_db::{CustomerRepository, Database, DbConfig, NewProduct};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 19, 0, 0).unwrap()
    }

    /// Places an order with the UTC date as "today", independent of the
    /// machine's time zone.
    pub async fn place(
        db: &Database,
        request: &OrderRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderConfirmation, AppError> {
        place_order_on(db, request, now, now.date_naive()).await
    }

    pub async fn database() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.initialize().await.unwrap();
        db
    }

    pub async fn customer(db: &Database, birth: NaiveDate, address: &str, prior_pizzas: i64) -> Customer {
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Anna".to_string(),
                birth_date: birth,
                address: address.to_string(),
                phone: "0612345678".to_string(),
            })
            .await
            .unwrap();

        if prior_pizzas > 0 {
            let mut tx = db.begin().await.unwrap();
            CustomerRepository::add_pizzas(&mut tx, customer.id, prior_pizzas)
                .await
                .unwrap();
            tx.commit().await.unwrap();
        }

        db.customers().get_by_id(customer.id).await.unwrap().unwrap()
    }

    /// Inserts a product whose menu price is exactly `price_cents`.
    ///
    /// The view multiplies cost by 1.526, so the cost is chosen to round back
    /// to the requested price.
    pub async fn product(db: &Database, name: &str, type_name: &str, price_cents: i64) -> i64 {
        let cost_cents = (price_cents as f64 / 1.526).round() as i64;
        let id = db
            .products()
            .insert(&NewProduct {
                name: name.to_string(),
                type_name: type_name.to_string(),
                is_vegan: false,
                is_vegetarian: false,
                cost_cents,
            })
            .await
            .unwrap();
        let priced = db.products().priced(id).await.unwrap().unwrap();
        assert_eq!(priced.price_cents, price_cents, "pick a price reachable from a whole-cent cost");
        id
    }

    pub async fn courier(db: &Database, name: &str, areas: &[&str]) -> i64 {
        let courier = db.couriers().insert(name, true).await.unwrap();
        for area in areas {
            db.couriers()
                .add_area(courier.id, &PostalPrefix::parse(area).unwrap())
                .await
                .unwrap();
        }
        courier.id
    }
}
