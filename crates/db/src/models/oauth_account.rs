//! OAuth account linkage model.

use serde::{Deserialize, Serialize};
use snaplink_core::types::DbId;
use sqlx::FromRow;

/// The federated login providers this service supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "oauth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    /// Lowercase provider name as stored in the database and used in URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user looked up by email, left-joined to their account link for one
/// provider.
///
/// `provider_account_id` is `None` when the user exists but has no link for
/// the provider in question -- the caller is expected to create one.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithProviderLink {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_email_valid: bool,
    pub avatar_url: Option<String>,
    pub provider_account_id: Option<String>,
}
