//! OAuth 2.0 provider clients (Google, GitHub).
//!
//! Both providers run the standard authorization-code exchange. The CSRF
//! `state` (and, for Google, the PKCE verifier) live in short-lived
//! http-only cookies set at initiation and checked at the callback; the
//! callback handlers collapse every failure mode -- missing parameters,
//! state mismatch, exchange rejection, profile-fetch errors -- into one
//! uniform failed-login outcome so nothing about the cause leaks to an
//! unauthenticated caller.

use oauth2::{AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RedirectUrl, TokenUrl};

pub mod github;
pub mod google;

pub use github::GithubOAuth;
pub use google::GoogleOAuth;

// ---------------------------------------------------------------------------
// Cookie names and lifetimes
// ---------------------------------------------------------------------------

/// Lifetime of the state/verifier cookies covering one exchange round-trip.
pub const OAUTH_EXCHANGE_EXPIRY_SECS: i64 = 600;

/// Cookie holding the Google CSRF state.
pub const GOOGLE_STATE_COOKIE: &str = "google_oauth_state";

/// Cookie holding the Google PKCE code verifier.
pub const GOOGLE_VERIFIER_COOKIE: &str = "google_code_verifier";

/// Cookie holding the GitHub CSRF state.
pub const GITHUB_STATE_COOKIE: &str = "github_oauth_state";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for provider interactions.
///
/// Callers surface every variant identically; the distinction exists for
/// server-side logs only.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The authorization-code exchange was rejected or unreachable.
    #[error("token exchange failed: {0}")]
    Exchange(String),

    /// The provider profile could not be fetched or decoded.
    #[error("profile fetch failed: {0}")]
    Profile(String),

    /// The provider account exposes no usable (primary) email address.
    #[error("provider account has no primary email")]
    MissingEmail,
}

// ---------------------------------------------------------------------------
// Provider profile
// ---------------------------------------------------------------------------

/// The provider-independent identity resolved from a callback.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// The provider's stable account id for this user.
    pub account_id: String,
    /// Display name reported by the provider.
    pub name: String,
    /// Email address the provider has verified.
    pub email: String,
    /// Avatar URL, when the provider reports one.
    pub avatar_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// OAuth client credentials and endpoints for one provider.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl OAuthCredentials {
    /// Google OAuth credentials from `GOOGLE_CLIENT_ID` /
    /// `GOOGLE_CLIENT_SECRET` / `GOOGLE_REDIRECT_URI`.
    ///
    /// Returns `None` when the client id or secret is unset, signalling that
    /// Google login should be disabled.
    pub fn google_from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:3000/google/callback".to_string());

        Some(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new("https://accounts.google.com/o/oauth2/v2/auth".to_string())
                .expect("static Google auth URL must parse"),
            token_url: TokenUrl::new("https://oauth2.googleapis.com/token".to_string())
                .expect("static Google token URL must parse"),
            redirect_url: RedirectUrl::new(redirect_uri).ok()?,
        })
    }

    /// GitHub OAuth credentials from `GITHUB_CLIENT_ID` /
    /// `GITHUB_CLIENT_SECRET` / `GITHUB_REDIRECT_URI`.
    pub fn github_from_env() -> Option<Self> {
        let client_id = std::env::var("GITHUB_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GITHUB_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GITHUB_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:3000/github/callback".to_string());

        Some(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new("https://github.com/login/oauth/authorize".to_string())
                .expect("static GitHub auth URL must parse"),
            token_url: TokenUrl::new("https://github.com/login/oauth/access_token".to_string())
                .expect("static GitHub token URL must parse"),
            redirect_url: RedirectUrl::new(redirect_uri).ok()?,
        })
    }
}

/// OAuth client type with auth URL and token URL set.
pub(crate) type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Build a configured `oauth2` client from credentials.
pub(crate) fn build_client(creds: &OAuthCredentials) -> ConfiguredClient {
    oauth2::basic::BasicClient::new(creds.client_id.clone())
        .set_client_secret(creds.client_secret.clone())
        .set_auth_uri(creds.auth_url.clone())
        .set_token_uri(creds.token_url.clone())
        .set_redirect_uri(creds.redirect_url.clone())
}
