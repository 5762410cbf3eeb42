//! Cookie construction for the token transport boundary.
//!
//! All auth cookies are http-only, `SameSite=Lax`, path `/`, and `Secure`
//! unless disabled for local development. Token cookie lifetimes track the
//! corresponding JWT expiry so the browser drops a cookie at roughly the
//! moment its token stops validating anyway.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::auth::jwt::JwtConfig;

/// Cookie holding the signed access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie holding the signed refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Build an http-only cookie with the standard auth attributes.
pub fn auth_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Build a cookie that instructs the browser to drop `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Add both token cookies to the jar.
pub fn set_token_cookies(
    jar: CookieJar,
    access_token: String,
    refresh_token: String,
    jwt: &JwtConfig,
    secure: bool,
) -> CookieJar {
    jar.add(auth_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token,
        jwt.access_expiry_secs(),
        secure,
    ))
    .add(auth_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh_token,
        jwt.refresh_expiry_secs(),
        secure,
    ))
}

/// Remove both token cookies from the jar.
pub fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    jar.add(removal_cookie(ACCESS_TOKEN_COOKIE))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE))
}
