//! Repository for the `sessions` table.

use snaplink_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, valid, ip, user_agent, created_at, updated_at";

/// Provides CRUD operations for sessions.
///
/// Invalidation is soft (`valid = false`) so revoked sessions stay visible
/// for auditing until the background reaper deletes them.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, ip, user_agent)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.ip)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its ID, whether valid or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Invalidate a single session. Idempotent: returns `true` only if the
    /// row transitioned from valid to invalid.
    pub async fn invalidate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET valid = false, updated_at = NOW()
             WHERE id = $1 AND valid = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Invalidate all active sessions for a user. Returns the count affected.
    pub async fn invalidate_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET valid = false, updated_at = NOW()
             WHERE user_id = $1 AND valid = true",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete invalidated sessions last touched before `cutoff`.
    ///
    /// Returns the count of deleted rows. Called by the background reaper.
    pub async fn delete_invalidated_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE valid = false AND updated_at < $1")
                .bind(cutoff)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
