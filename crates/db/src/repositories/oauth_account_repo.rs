//! Repository for the `oauth_accounts` table.

use snaplink_core::types::DbId;
use sqlx::PgPool;

use crate::models::oauth_account::{OAuthProvider, UserWithProviderLink};
use crate::models::user::User;

/// Column list of the `users` table, used by the transactional insert.
const USER_COLUMNS: &str = "id, name, email, password_hash, avatar_url, is_email_valid, \
                             created_at, updated_at";

/// Provides operations linking users to federated identities.
pub struct OAuthAccountRepo;

impl OAuthAccountRepo {
    /// Look up a user by email, left-joined to their account link for the
    /// given provider.
    ///
    /// Returns `None` when no user with this email exists at all. When the
    /// user exists but has never linked this provider,
    /// `provider_account_id` is `None`.
    pub async fn find_user_with_link(
        pool: &PgPool,
        email: &str,
        provider: OAuthProvider,
    ) -> Result<Option<UserWithProviderLink>, sqlx::Error> {
        sqlx::query_as::<_, UserWithProviderLink>(
            "SELECT u.id, u.name, u.email, u.is_email_valid, u.avatar_url,
                    oa.provider_account_id
             FROM users u
             LEFT JOIN oauth_accounts oa
                ON oa.user_id = u.id AND oa.provider = $2
             WHERE u.email = $1",
        )
        .bind(email)
        .bind(provider)
        .fetch_optional(pool)
        .await
    }

    /// Link an existing user to a federated identity.
    ///
    /// Also backfills the user's avatar URL, but only when none is set --
    /// an avatar the user already has is never overwritten.
    pub async fn link(
        pool: &PgPool,
        user_id: DbId,
        provider: OAuthProvider,
        provider_account_id: &str,
        avatar_url: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO oauth_accounts (user_id, provider, provider_account_id)
             VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(provider)
        .bind(provider_account_id)
        .execute(pool)
        .await?;

        if let Some(avatar_url) = avatar_url {
            sqlx::query(
                "UPDATE users SET avatar_url = $2, updated_at = NOW()
                 WHERE id = $1 AND avatar_url IS NULL",
            )
            .bind(user_id)
            .bind(avatar_url)
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    /// Create a new user from a federated identity and link it, atomically.
    ///
    /// The user row is inserted with `is_email_valid = true` since the
    /// provider has already verified the address. Both inserts commit or
    /// neither does.
    pub async fn create_user_with_link(
        pool: &PgPool,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
        provider: OAuthProvider,
        provider_account_id: &str,
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (name, email, avatar_url, is_email_valid)
             VALUES ($1, $2, $3, true)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(name)
            .bind(email)
            .bind(avatar_url)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO oauth_accounts (user_id, provider, provider_account_id)
             VALUES ($1, $2, $3)",
        )
        .bind(user.id)
        .bind(provider)
        .bind(provider_account_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}
