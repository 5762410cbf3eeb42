//! Repository for the `password_reset_tokens` table.

use snaplink_core::types::DbId;
use sqlx::PgPool;

use crate::models::password_reset::PasswordResetToken;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, created_at";

/// Provides operations for password reset tokens.
///
/// Only token digests are handled here; hashing the raw token is the
/// caller's concern.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Replace any outstanding reset token for a user with a fresh digest.
    ///
    /// Delete-then-insert keeps the per-user unique constraint satisfied
    /// without an upsert.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO password_reset_tokens (user_id, token_hash) VALUES ($1, $2)")
            .bind(user_id)
            .bind(token_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    /// Find an unexpired token row by the digest of a presented token.
    pub async fn find_valid_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_reset_tokens
             WHERE token_hash = $1 AND expires_at >= NOW()"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Consume a user's reset token and set their new password hash.
    ///
    /// Deleting the token row and updating the password happen in one
    /// transaction so a token can never be spent twice: the second attempt
    /// finds no row.
    pub async fn consume_and_set_password(
        pool: &PgPool,
        user_id: DbId,
        new_password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(new_password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}
