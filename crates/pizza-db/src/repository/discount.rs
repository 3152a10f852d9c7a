//! # Discount Code Repository
//!
//! One-time codes. A code is consumed with a guarded update so two orders
//! can never both succeed with the same code:
//!
//! ```text
//! UPDATE discount_code SET is_used = 1 WHERE id = ? AND is_used = 0
//!                                                     ────────────
//!   rows_affected = 1  → this order owns the code
//!   rows_affected = 0  → somebody else got there first
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use pizza_core::validation::{normalize_discount_code, validate_percent};
use pizza_core::DiscountCode;

/// Repository for discount codes.
#[derive(Debug, Clone)]
pub struct DiscountCodeRepository {
    pool: SqlitePool,
}

impl DiscountCodeRepository {
    /// Creates a new DiscountCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountCodeRepository { pool }
    }

    /// Finds a code by its exact string.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<DiscountCode>> {
        let found = sqlx::query_as::<_, DiscountCode>(
            "SELECT id, code, percent, is_used FROM discount_code WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    /// Inserts an unused code and returns it.
    ///
    /// Codes are stored trimmed and upper-cased, the same form lookups use.
    pub async fn insert(&self, code: &str, percent: i64) -> DbResult<DiscountCode> {
        let code = normalize_discount_code(code).map_err(|e| DbError::CheckViolation(e.to_string()))?;
        validate_percent(percent).map_err(|e| DbError::CheckViolation(e.to_string()))?;

        let created = sqlx::query_as::<_, DiscountCode>(
            r#"
            INSERT INTO discount_code (code, percent, is_used)
            VALUES (?1, ?2, 0)
            RETURNING id, code, percent, is_used
            "#,
        )
        .bind(&code)
        .bind(percent)
        .fetch_one(&self.pool)
        .await?;

        debug!(code = %created.code, percent, "Inserted discount code");
        Ok(created)
    }

    /// Marks the code used if it still is unused.
    ///
    /// Returns `false` when the code was already consumed.
    pub async fn consume(conn: &mut SqliteConnection, code_id: i64) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE discount_code SET is_used = 1 WHERE id = ?1 AND is_used = 0")
                .bind(code_id)
                .execute(&mut *conn)
                .await?;

        let consumed = result.rows_affected() == 1;
        debug!(code_id, consumed, "Discount code consume attempted");
        Ok(consumed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db.discount_codes().insert("WELCOME10", 10).await.unwrap();
        assert!(!created.is_used);

        let found = db.discount_codes().find_by_code("WELCOME10").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(db.discount_codes().find_by_code("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_only_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let code = db.discount_codes().insert("ONCE", 20).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(DiscountCodeRepository::consume(&mut tx, code.id).await.unwrap());
        assert!(!DiscountCodeRepository::consume(&mut tx, code.id).await.unwrap());
        tx.commit().await.unwrap();

        let code = db.discount_codes().find_by_code("ONCE").await.unwrap().unwrap();
        assert!(code.is_used);
    }

    #[tokio::test]
    async fn test_insert_stores_normalized_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db.discount_codes().insert(" summer5 ", 5).await.unwrap();
        assert_eq!(created.code, "SUMMER5");

        let found = db.discount_codes().find_by_code("SUMMER5").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        let err = db.discount_codes().insert("   ", 5).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_percent_and_duplicates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.discount_codes().insert("HUGE", 101).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));

        let err = db.discount_codes().insert("NEGATIVE", -1).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));

        db.discount_codes().insert("DUP", 5).await.unwrap();
        let err = db.discount_codes().insert("dup", 5).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
