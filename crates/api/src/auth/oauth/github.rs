//! GitHub authorization-code flow.
//!
//! Unlike Google, GitHub runs without PKCE -- only the CSRF state cookie
//! binds the callback to the initiating browser. GitHub also does not
//! reliably expose an email on `/user`, so a second call lists the
//! account's addresses and the one flagged primary is selected; an account
//! with no primary email cannot log in.

use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse};
use serde::Deserialize;

use super::{build_client, OAuthCredentials, OAuthError, ProviderProfile};

/// GitHub user info from the REST API.
#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
}

/// GitHub email entry from `/user/emails`.
#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
}

/// GitHub OAuth handler.
pub struct GithubOAuth {
    creds: OAuthCredentials,
}

impl GithubOAuth {
    /// Create a new GitHub OAuth handler.
    pub fn new(creds: OAuthCredentials) -> Self {
        Self { creds }
    }

    /// Build the authorization URL.
    ///
    /// Returns `(url, csrf_state)`; the state goes into a short-lived cookie
    /// and comes back at the callback.
    pub fn authorize_url(&self) -> (String, String) {
        let client = build_client(&self.creds);

        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("user:email".to_string()))
            .url();

        (auth_url.to_string(), csrf_state.secret().clone())
    }

    /// Exchange an authorization code for tokens and resolve the profile.
    pub async fn exchange(
        &self,
        http: &reqwest::Client,
        code: &str,
    ) -> Result<ProviderProfile, OAuthError> {
        let client = build_client(&self.creds);

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(http)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        let access_token = token_result.access_token().secret();

        let github_user: GitHubUser = http
            .get("https://api.github.com/user")
            .header("Authorization", format!("Bearer {access_token}"))
            .header("User-Agent", "snaplink")
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .error_for_status()
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        let emails: Vec<GitHubEmail> = http
            .get("https://api.github.com/user/emails")
            .header("Authorization", format!("Bearer {access_token}"))
            .header("User-Agent", "snaplink")
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .error_for_status()
            .map_err(|e| OAuthError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        let email = emails
            .into_iter()
            .find(|e| e.primary)
            .map(|e| e.email)
            .ok_or(OAuthError::MissingEmail)?;

        let name = github_user.name.unwrap_or(github_user.login);

        Ok(ProviderProfile {
            account_id: github_user.id.to_string(),
            name,
            email,
            avatar_url: github_user.avatar_url,
        })
    }
}
