use crate::auth::jwt::JwtConfig;
use crate::auth::oauth::OAuthCredentials;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have sensible defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public origin used to build links embedded in emails.
    pub public_base_url: String,
    /// Whether cookies are flagged `Secure` (default: `true`; disable for
    /// plain-HTTP local development).
    pub secure_cookies: bool,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Google OAuth credentials; `None` disables the Google login routes.
    pub google: Option<OAuthCredentials>,
    /// GitHub OAuth credentials; `None` disables the GitHub login routes.
    pub github: Option<OAuthCredentials>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`    |
    /// | `SECURE_COOKIES`       | `true`                     |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`]; OAuth
    /// variables on [`OAuthCredentials`]. Providers with missing credentials
    /// are disabled with a logged warning rather than failing startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|v| v != "false")
            .unwrap_or(true);

        let jwt = JwtConfig::from_env();

        let google = OAuthCredentials::google_from_env();
        if google.is_none() {
            tracing::warn!("Google OAuth credentials not set; Google login disabled");
        }
        let github = OAuthCredentials::github_from_env();
        if github.is_none() {
            tracing::warn!("GitHub OAuth credentials not set; GitHub login disabled");
        }

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            secure_cookies,
            jwt,
            google,
            github,
        }
    }
}
