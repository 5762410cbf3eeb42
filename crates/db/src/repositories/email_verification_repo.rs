//! Repository for the `verify_email_tokens` table.

use snaplink_core::types::DbId;
use sqlx::PgPool;

use crate::models::email_verification::VerificationMatch;

/// Provides operations for email verification codes.
pub struct EmailVerificationRepo;

impl EmailVerificationRepo {
    /// Replace any outstanding code for a user with a fresh one.
    ///
    /// Runs as a single transaction:
    /// 1. purge all globally expired codes,
    /// 2. purge any existing code for this user,
    /// 3. insert the new code.
    ///
    /// The transaction closes the race where two concurrent issuances both
    /// pass an "existing code" check and leave two active codes behind.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        token: &str,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM verify_email_tokens WHERE expires_at < NOW()")
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM verify_email_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO verify_email_tokens (user_id, token) VALUES ($1, $2)")
            .bind(user_id)
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    /// Find an unexpired code matching both the token and the owning user's
    /// email address.
    pub async fn find_valid(
        pool: &PgPool,
        token: &str,
        email: &str,
    ) -> Result<Option<VerificationMatch>, sqlx::Error> {
        sqlx::query_as::<_, VerificationMatch>(
            "SELECT u.id AS user_id, u.email, t.token, t.expires_at
             FROM verify_email_tokens t
             INNER JOIN users u ON u.id = t.user_id
             WHERE t.token = $1 AND u.email = $2 AND t.expires_at >= NOW()",
        )
        .bind(token)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Delete every code belonging to a user. Returns the count deleted.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM verify_email_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
