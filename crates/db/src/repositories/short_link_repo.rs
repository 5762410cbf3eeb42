//! Read access to the `short_links` table.
//!
//! The shortener owns this table; the auth subsystem only lists a user's
//! links for the profile view.

use snaplink_core::types::DbId;
use sqlx::PgPool;

use crate::models::short_link::ShortLink;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, short_code, url, user_id, created_at, updated_at";

/// User-scoped reads over short links.
pub struct ShortLinkRepo;

impl ShortLinkRepo {
    /// List all short links owned by a user, most recent first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<ShortLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM short_links
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ShortLink>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
