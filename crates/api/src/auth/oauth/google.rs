//! Google authorization-code flow with PKCE.

use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, Scope, TokenResponse};
use serde::Deserialize;

use super::{build_client, OAuthCredentials, OAuthError, ProviderProfile};

/// Google user info from the userinfo API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

/// Google OAuth handler.
pub struct GoogleOAuth {
    creds: OAuthCredentials,
}

impl GoogleOAuth {
    /// Create a new Google OAuth handler.
    pub fn new(creds: OAuthCredentials) -> Self {
        Self { creds }
    }

    /// Build the authorization URL with PKCE.
    ///
    /// Returns `(url, csrf_state, pkce_verifier)`; state and verifier go
    /// into short-lived cookies and come back at the callback.
    pub fn authorize_url(&self) -> (String, String, String) {
        let client = build_client(&self.creds);
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        (
            auth_url.to_string(),
            csrf_state.secret().clone(),
            pkce_verifier.secret().clone(),
        )
    }

    /// Exchange an authorization code for tokens and resolve the profile.
    pub async fn exchange(
        &self,
        http: &reqwest::Client,
        code: &str,
        pkce_verifier: String,
    ) -> Result<ProviderProfile, OAuthError> {
        let client = build_client(&self.creds);

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(http)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        let access_token = token_result.access_token().secret();

        let google_user: GoogleUser = http
            .get("https://www.googleapis.com/oauth2/v2/userinfo")
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .error_for_status()
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        let name = google_user
            .name
            .unwrap_or_else(|| google_user.email.clone());

        Ok(ProviderProfile {
            account_id: google_user.id,
            name,
            email: google_user.email,
            avatar_url: google_user.picture,
        })
    }
}
