//! # Product Repository
//!
//! Menu reads go through the `v_product_prices` view, which owns the
//! margin-and-VAT price formula. Writes exist only for seeding.
//!
//! ## Price Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  priced(7)                                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  v_product_prices row? ──yes──► PricedProduct { price_cents, ... }      │
//! │       │                                                                 │
//! │       no                                                                │
//! │       ▼                                                                 │
//! │  None (caller decides: unknown product vs. unpriced product)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pizza_core::PricedProduct;

const SELECT_PRICED: &str = r#"
    SELECT
        product_id        AS id,
        name,
        category          AS type_name,
        is_vegan,
        is_vegetarian,
        final_price_cents AS price_cents
    FROM v_product_prices
"#;

/// Input for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub type_name: String,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub cost_cents: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Full priced menu, ordered by category then name.
    pub async fn menu(&self) -> DbResult<Vec<PricedProduct>> {
        let products =
            sqlx::query_as::<_, PricedProduct>(&format!("{SELECT_PRICED} ORDER BY category, name"))
                .fetch_all(&self.pool)
                .await?;

        debug!(count = products.len(), "Loaded menu");
        Ok(products)
    }

    /// Priced row for one product, `None` when the view has no row for it.
    pub async fn priced(&self, product_id: i64) -> DbResult<Option<PricedProduct>> {
        let product =
            sqlx::query_as::<_, PricedProduct>(&format!("{SELECT_PRICED} WHERE product_id = ?1"))
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(product)
    }

    /// True when a product row exists, priced or not.
    pub async fn exists(&self, product_id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM product WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns the id of the named product type, creating it if needed.
    pub async fn ensure_type(&self, name: &str) -> DbResult<i64> {
        sqlx::query("INSERT OR IGNORE INTO product_type (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let id = sqlx::query_scalar("SELECT id FROM product_type WHERE name = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// Inserts a product and returns its id.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<i64> {
        let type_id = self.ensure_type(&product.type_name).await?;

        let id = sqlx::query_scalar(
            r#"
            INSERT INTO product (name, product_type_id, is_vegan, is_vegetarian, cost_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(type_id)
        .bind(product.is_vegan)
        .bind(product.is_vegetarian)
        .bind(product.cost_cents)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, name = %product.name, "Inserted product");
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
