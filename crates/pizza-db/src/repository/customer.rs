//! # Customer Repository
//!
//! Registration, lookup and the pizza counter that drives the loyalty
//! discount.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use pizza_core::{Customer, NewCustomer};

const SELECT_CUSTOMER: &str = r#"
    SELECT id, name, birth_date, address, phone, pizza_count
    FROM customer
"#;

/// Repository for customer database operations.
///
/// ## Usage
/// ```rust,ignore
/// let customer = db.customers().insert(&new_customer).await?;
/// let all = db.customers().list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer with a pizza count of zero and returns the stored row.
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        debug!(name = %customer.name, "Inserting customer");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customer (name, birth_date, address, phone, pizza_count)
            VALUES (?1, ?2, ?3, ?4, 0)
            RETURNING id
            "#,
        )
        .bind(&customer.name)
        .bind(customer.birth_date)
        .bind(&customer.address)
        .bind(&customer.phone)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Gets a customer by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - No customer with that id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Lists every customer ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Number of customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM customer")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Adds `units` to the customer's pizza count inside an open transaction.
    pub async fn add_pizzas(conn: &mut SqliteConnection, customer_id: i64, units: i64) -> DbResult<()> {
        if units == 0 {
            return Ok(());
        }

        let result = sqlx::query("UPDATE customer SET pizza_count = pizza_count + ?2 WHERE id = ?1")
            .bind(customer_id)
            .bind(units)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        debug!(customer_id, units, "Pizza count incremented");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
