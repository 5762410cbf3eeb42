//! Shared harness for HTTP-level integration tests.
//!
//! Mirrors the router construction in `main.rs` (via
//! [`snaplink_api::router::build_app_router`]) so tests exercise the same
//! middleware stack that production uses. The mailer is left unconfigured:
//! email dispatch is fire-and-forget, so flows behave identically without
//! a relay.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use snaplink_api::auth::jwt::JwtConfig;
use snaplink_api::config::ServerConfig;
use snaplink_api::router::build_app_router;
use snaplink_api::state::AppState;

/// Known JWT secret so tests can decode issued tokens.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-enough-length";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:3000".to_string(),
        // Plain-HTTP test transport.
        secure_cookies: false,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        google: None,
        github: None,
    }
}

/// Build the full application router against the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer: None,
        http: reqwest::Client::new(),
    };
    build_app_router(state, &config)
}

/// Send a urlencoded form POST.
pub async fn post_form(app: Router, path: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a urlencoded form POST with a `Cookie` header.
pub async fn post_form_with_cookies(
    app: Router,
    path: &str,
    body: &str,
    cookies: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .header("cookie", cookies)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET with a `Cookie` header.
pub async fn get_with_cookies(app: Router, path: &str, cookies: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("cookie", cookies)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a bare GET.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .collect()
}

/// Extract the value of a named cookie from `Set-Cookie` headers.
///
/// Returns `None` when the cookie is absent or set to empty (removal).
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let (pair, _) = c.split_once(';').unwrap_or((c.as_str(), ""));
        let (cookie_name, value) = pair.split_once('=')?;
        (cookie_name == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Build a `Cookie` request header from both token cookies of a response.
pub fn auth_cookie_header(cookies: &[String]) -> String {
    let access = cookie_value(cookies, "access_token").expect("access_token cookie");
    let refresh = cookie_value(cookies, "refresh_token").expect("refresh_token cookie");
    format!("access_token={access}; refresh_token={refresh}")
}

/// The `Location` header of a redirect response.
pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
