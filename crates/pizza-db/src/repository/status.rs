//! # Status Repository
//!
//! The `status` table holds the fixed order-status vocabulary. Orders point
//! at it by id; every query that returns an order joins it back to the code.
//!
//! Seeding is explicit: [`StatusRepository::ensure_defaults`] is called once
//! from `Database::initialize`, never as a side effect of a lookup.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use pizza_core::OrderStatus;

/// Repository for the order-status vocabulary.
#[derive(Debug, Clone)]
pub struct StatusRepository {
    pool: SqlitePool,
}

impl StatusRepository {
    /// Creates a new StatusRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatusRepository { pool }
    }

    /// Inserts every known status code that is missing.
    ///
    /// Idempotent. Returns how many codes were inserted.
    pub async fn ensure_defaults(&self) -> DbResult<u64> {
        let mut inserted = 0;

        for status in OrderStatus::ALL {
            let result = sqlx::query("INSERT OR IGNORE INTO status (code) VALUES (?1)")
                .bind(status.code())
                .execute(&self.pool)
                .await?;
            inserted += result.rows_affected();
        }

        if inserted > 0 {
            info!(inserted, "Seeded order statuses");
        }
        Ok(inserted)
    }

    /// All status codes, by id.
    pub async fn list(&self) -> DbResult<Vec<String>> {
        let codes = sqlx::query_scalar("SELECT code FROM status ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(codes)
    }

    /// Looks up the row id of `status` on an open connection.
    ///
    /// Fails with `NotFound` when the vocabulary was never seeded.
    pub async fn id_of(conn: &mut SqliteConnection, status: OrderStatus) -> DbResult<i64> {
        debug!(status = %status, "Resolving status id");

        sqlx::query_scalar("SELECT id FROM status WHERE code = ?1")
            .bind(status.code())
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("Status", status.code()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_ensure_defaults_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.statuses().ensure_defaults().await.unwrap(), 4);
        assert_eq!(db.statuses().ensure_defaults().await.unwrap(), 0);

        let codes = db.statuses().list().await.unwrap();
        assert_eq!(
            codes,
            vec!["CREATED", "IN_PROGRESS", "OUT_FOR_DELIVERY", "DELIVERED"]
        );
    }

    #[tokio::test]
    async fn test_id_of_requires_seeding() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let err = StatusRepository::id_of(&mut conn, OrderStatus::Created)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        drop(conn);

        db.initialize().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        assert!(StatusRepository::id_of(&mut conn, OrderStatus::Delivered)
            .await
            .is_ok());
    }
}
