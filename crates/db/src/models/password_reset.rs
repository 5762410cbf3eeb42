//! Password reset token model.

use snaplink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_reset_tokens` table.
///
/// Holds only the SHA-256 digest of the emailed token. At most one row per
/// user exists at a time (`uq_password_reset_tokens_user_id`).
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
