//! # Database Migrations
//!
//! Embedded SQL migrations for the ordering store.
//!
//! ```text
//! migrations/sqlite/
//! ├── 001_initial_schema.sql       customer, product, discount_code,
//! │                                delivery_person(+_postal), status,
//! │                                orders, order_item
//! └── 002_product_prices_view.sql  v_product_prices (cost × 1.526, rounded)
//! ```
//!
//! Applied in filename order and recorded in `_sqlx_migrations`, so running
//! them again is a no-op. Existing files are never edited; schema changes go
//! in a new `NNN_description.sql`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Embedded migrations from the workspace `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Brings the schema up to date.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
