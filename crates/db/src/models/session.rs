//! Session model and DTOs.

use snaplink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
///
/// Sessions carry no expiry of their own; only the refresh token derived from
/// a session is time-bounded. A session ends when `valid` is cleared.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub valid: bool,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: DbId,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}
