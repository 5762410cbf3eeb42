//! Short link entity (owned by the shortener collaborator).
//!
//! The auth subsystem only ever reads these rows scoped to a user, for the
//! profile listing.

use serde::Serialize;
use snaplink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `short_links` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShortLink {
    pub id: DbId,
    pub short_code: String,
    pub url: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
