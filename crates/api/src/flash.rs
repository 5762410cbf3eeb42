//! One-shot flash messages.
//!
//! Browser-facing failures answer with a redirect plus a transient message.
//! The message travels in a short-lived cookie that the next page view reads
//! and clears -- an explicit one-shot channel rather than server-side
//! request-scoped state. The value is percent-encoded so arbitrary text
//! survives the cookie grammar.

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie carrying the pending flash message.
pub const FLASH_COOKIE: &str = "flash";

/// How long an unread flash message survives.
const FLASH_MAX_AGE_SECS: i64 = 60;

/// Add a flash message to the jar.
///
/// Not http-only: the rendering layer reads it client-side.
pub fn set_flash(jar: CookieJar, message: &str) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(FLASH_MAX_AGE_SECS))
        .build();
    jar.add(cookie)
}

/// Flash a message and redirect -- the standard browser-flow failure answer.
pub fn flash_redirect(jar: CookieJar, message: &str, location: &str) -> (CookieJar, Redirect) {
    (set_flash(jar, message), Redirect::to(location))
}

/// Take the pending flash message, clearing it from the jar.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .map(|c| urlencoding::decode(c.value()).unwrap_or_default().into_owned());

    let jar = jar.add(
        Cookie::build((FLASH_COOKIE, ""))
            .path("/")
            .max_age(Duration::ZERO)
            .build(),
    );

    (jar, message)
}
