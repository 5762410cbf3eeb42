//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use snaplink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// `None` for accounts created via social login that never set a password.
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub is_email_valid: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether this account can authenticate with a password at all.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub is_email_valid: bool,
    /// Whether a password is set (social-login accounts may not have one).
    pub has_password: bool,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let has_password = user.has_password();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            is_email_valid: user.is_email_valid,
            has_password,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// `None` when the account is being created from a social login.
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    /// Social-login providers have already verified the address.
    pub is_email_valid: bool,
}

/// DTO for updating a user's profile. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}
