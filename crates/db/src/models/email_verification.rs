//! Email verification token projections.

use snaplink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A verification token joined to its owning user.
///
/// Produced by the consume query, which matches token + email + expiry in a
/// single statement; the full `verify_email_tokens` row is never read back
/// on its own.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationMatch {
    pub user_id: DbId,
    pub email: String,
    pub token: String,
    pub expires_at: Timestamp,
}
