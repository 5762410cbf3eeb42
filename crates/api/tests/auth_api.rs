//! HTTP-level integration tests for the auth flows: registration, login,
//! logout, refresh, email verification, and password reset.

mod common;

use axum::http::StatusCode;
use common::{
    auth_cookie_header, body_json, cookie_value, get, get_with_cookies, location, post_form,
    post_form_with_cookies, set_cookies, test_config,
};
use snaplink_api::auth::jwt::validate_access_token;
use snaplink_core::tokens::generate_reset_token;
use snaplink_db::models::user::CreateUser;
use snaplink_db::repositories::{PasswordResetRepo, UserRepo};
use sqlx::PgPool;

/// Percent-encoded flash value for the generic credential failure.
const INVALID_CREDENTIALS_FLASH: &str = "Invalid%20Credentials";

/// Register a user through the API and return the `Set-Cookie` values.
async fn register(app: axum::Router, name: &str, email: &str, password: &str) -> Vec<String> {
    let body = format!(
        "name={name}&email={}&password={password}",
        email.replace('@', "%40")
    );
    let response = post_form(app, "/register", &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));
    set_cookies(&response)
}

/// Decode the session id out of an issued access-token cookie.
fn session_id_of(cookies: &[String]) -> i64 {
    let token = cookie_value(cookies, "access_token").expect("access_token cookie");
    let claims = validate_access_token(&token, &test_config().jwt).expect("valid access token");
    claims.sid
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration authenticates immediately and starts with an unverified email.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_authenticates_and_starts_unverified(pool: PgPool) {
    let app = common::build_test_app(pool);

    let cookies = register(app.clone(), "Alice", "alice@test.com", "secret123").await;
    assert!(cookie_value(&cookies, "access_token").is_some());
    assert!(cookie_value(&cookies, "refresh_token").is_some());

    let response = get_with_cookies(app, "/profile", &auth_cookie_header(&cookies)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], "alice@test.com");
    assert_eq!(json["data"]["user"]["is_email_valid"], false);
    assert_eq!(json["data"]["user"]["has_password"], true);
}

/// A duplicate email is rejected with a specific conflict message.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_email_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    register(app.clone(), "Alice", "dup@test.com", "secret123").await;

    let response = post_form(
        app,
        "/register",
        "name=Mallory&email=dup%40test.com&password=secret456",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/register"));

    let flash = cookie_value(&set_cookies(&response), "flash").expect("flash cookie");
    assert!(flash.contains("Already%20Exists"), "flash: {flash}");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Unknown email and wrong password produce byte-identical outcomes.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_failures_are_indistinguishable(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.clone(), "Alice", "alice@test.com", "secret123").await;

    let wrong_password = post_form(
        app.clone(),
        "/login",
        "email=alice%40test.com&password=wrong-pass",
    )
    .await;
    let unknown_email = post_form(
        app,
        "/login",
        "email=ghost%40test.com&password=whatever-pass",
    )
    .await;

    for response in [&wrong_password, &unknown_email] {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(response).as_deref(), Some("/login"));
    }

    let flash_a = cookie_value(&set_cookies(&wrong_password), "flash").unwrap();
    let flash_b = cookie_value(&set_cookies(&unknown_email), "flash").unwrap();
    assert_eq!(flash_a, INVALID_CREDENTIALS_FLASH);
    assert_eq!(flash_a, flash_b, "no enumeration signal between the two");
}

/// A successful login issues a session distinct from the registration one.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_issues_a_fresh_session(pool: PgPool) {
    let app = common::build_test_app(pool);

    let register_cookies = register(app.clone(), "Alice", "alice@test.com", "secret123").await;

    let response = post_form(
        app.clone(),
        "/login",
        "email=alice%40test.com&password=secret123",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let login_cookies = set_cookies(&response);

    assert_ne!(
        session_id_of(&register_cookies),
        session_id_of(&login_cookies),
        "each authentication event gets its own session"
    );

    let me = get_with_cookies(app, "/me", &auth_cookie_header(&login_cookies)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let json = body_json(me).await;
    assert_eq!(json["data"]["email"], "alice@test.com");
}

/// A social-login-only account gets the distinct explanatory message.
#[sqlx::test(migrations = "../db/migrations")]
async fn social_only_account_gets_distinct_message(pool: PgPool) {
    UserRepo::create(
        &pool,
        &CreateUser {
            name: "Social Sam".to_string(),
            email: "sam@test.com".to_string(),
            password_hash: None,
            avatar_url: None,
            is_email_valid: true,
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool);
    let response = post_form(app, "/login", "email=sam%40test.com&password=irrelevant").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let flash = cookie_value(&set_cookies(&response), "flash").unwrap();
    assert!(flash.contains("social"), "flash: {flash}");
    assert_ne!(flash, INVALID_CREDENTIALS_FLASH);
}

// ---------------------------------------------------------------------------
// Logout and session revocation
// ---------------------------------------------------------------------------

/// Logout invalidates the session: outstanding tokens stop working even
/// though the JWTs themselves are still within their lifetime.
#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_outstanding_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let cookies = register(app.clone(), "Alice", "alice@test.com", "secret123").await;
    let header = auth_cookie_header(&cookies);

    let response = post_form_with_cookies(app.clone(), "/logout", "", &header).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Access path rejected.
    let me = get_with_cookies(app.clone(), "/me", &header).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    // Refresh path rejected too.
    let refresh = post_form_with_cookies(app, "/refresh", "", &header).await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

/// Logging out twice is harmless.
#[sqlx::test(migrations = "../db/migrations")]
async fn logout_is_idempotent(pool: PgPool) {
    let app = common::build_test_app(pool);
    let cookies = register(app.clone(), "Alice", "alice@test.com", "secret123").await;
    let header = auth_cookie_header(&cookies);

    let first = post_form_with_cookies(app.clone(), "/logout", "", &header).await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = post_form_with_cookies(app, "/logout", "", &header).await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// Refresh rotates token material but the session id is stable.
#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_tokens_but_keeps_session(pool: PgPool) {
    let app = common::build_test_app(pool);

    let cookies = register(app.clone(), "Alice", "alice@test.com", "secret123").await;
    let header = auth_cookie_header(&cookies);

    let response = post_form_with_cookies(app, "/refresh", "", &header).await;
    assert_eq!(response.status(), StatusCode::OK);

    let new_cookies = set_cookies(&response);
    assert_ne!(
        cookie_value(&cookies, "refresh_token"),
        cookie_value(&new_cookies, "refresh_token"),
        "refresh token material must rotate"
    );
    assert_eq!(
        session_id_of(&cookies),
        session_id_of(&new_cookies),
        "session id must be stable across rotation"
    );

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "alice@test.com");
}

/// Refresh without a cookie is a 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_requires_cookie(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_form(app, "/refresh", "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Email verification
// ---------------------------------------------------------------------------

/// The emailed code flips the verified flag; a replaced code stops working.
#[sqlx::test(migrations = "../db/migrations")]
async fn verification_code_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let cookies = register(app.clone(), "Alice", "alice@test.com", "secret123").await;
    let header = auth_cookie_header(&cookies);

    // The code is only ever emailed; fish it out of storage for the test.
    let (code,): (String,) = sqlx::query_as(
        "SELECT token FROM verify_email_tokens t
         JOIN users u ON u.id = t.user_id WHERE u.email = $1",
    )
    .bind("alice@test.com")
    .fetch_one(&pool)
    .await
    .unwrap();

    // Reissue: the first code must stop being consumable.
    let resend = post_form_with_cookies(app.clone(), "/resend-verification-link", "", &header).await;
    assert_eq!(resend.status(), StatusCode::SEE_OTHER);

    let stale = get(
        app.clone(),
        &format!("/verify-email-token?token={code}&email=alice%40test.com"),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&stale).as_deref(), Some("/"), "stale code fails");

    let (fresh_code,): (String,) = sqlx::query_as(
        "SELECT token FROM verify_email_tokens t
         JOIN users u ON u.id = t.user_id WHERE u.email = $1",
    )
    .bind("alice@test.com")
    .fetch_one(&pool)
    .await
    .unwrap();

    let consumed = get(
        app.clone(),
        &format!("/verify-email-token?token={fresh_code}&email=alice%40test.com"),
    )
    .await;
    assert_eq!(consumed.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&consumed).as_deref(), Some("/profile"));

    let profile = get_with_cookies(app, "/profile", &header).await;
    let json = body_json(profile).await;
    assert_eq!(json["data"]["user"]["is_email_valid"], true);
}

/// A malformed or unknown link gets the uniform failure redirect.
#[sqlx::test(migrations = "../db/migrations")]
async fn verification_rejects_bad_links(pool: PgPool) {
    let app = common::build_test_app(pool);

    for path in [
        "/verify-email-token",
        "/verify-email-token?token=123&email=a%40b.com",
        "/verify-email-token?token=99999999&email=ghost%40test.com",
    ] {
        let response = get(app.clone(), path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response).as_deref(), Some("/"));
    }
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// The forgot-password response is identical for known and unknown emails.
#[sqlx::test(migrations = "../db/migrations")]
async fn forgot_password_does_not_enumerate(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.clone(), "Alice", "alice@test.com", "secret123").await;

    let known = post_form(app.clone(), "/reset-password", "email=alice%40test.com").await;
    let unknown = post_form(app, "/reset-password", "email=nobody%40test.com").await;

    assert_eq!(known.status(), unknown.status());
    assert_eq!(location(&known), location(&unknown));
    assert_eq!(
        cookie_value(&set_cookies(&known), "flash"),
        cookie_value(&set_cookies(&unknown), "flash"),
        "client-visible outcome must not depend on account existence"
    );
}

/// Full reset: redeem once, old password dead, token not reusable.
#[sqlx::test(migrations = "../db/migrations")]
async fn reset_token_redeems_exactly_once(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app.clone(), "Alice", "alice@test.com", "old-secret").await;

    let user = UserRepo::find_by_email(&pool, "alice@test.com")
        .await
        .unwrap()
        .unwrap();

    // Plant a reset token the way issuance does (raw token normally only
    // exists inside the email).
    let generated = generate_reset_token();
    PasswordResetRepo::replace_for_user(&pool, user.id, &generated.hash)
        .await
        .unwrap();

    let path = format!("/reset-password/{}", generated.plaintext);

    // Probe says it is redeemable.
    let probe = get(app.clone(), &path).await;
    assert_eq!(probe.status(), StatusCode::OK);
    assert_eq!(body_json(probe).await["data"]["valid"], true);

    // Redeem.
    let redeem = post_form(
        app.clone(),
        &path,
        "new_password=new-secret-1&confirm_password=new-secret-1",
    )
    .await;
    assert_eq!(redeem.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&redeem).as_deref(), Some("/login"));

    // Second redemption attempt fails.
    let again = post_form(
        app.clone(),
        &path,
        "new_password=other-secret&confirm_password=other-secret",
    )
    .await;
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&again).as_deref(), Some("/reset-password"));

    // Old password is dead, new one works.
    let old = post_form(
        app.clone(),
        "/login",
        "email=alice%40test.com&password=old-secret",
    )
    .await;
    assert_eq!(
        cookie_value(&set_cookies(&old), "flash").unwrap(),
        INVALID_CREDENTIALS_FLASH
    );

    let new = post_form(
        app,
        "/login",
        "email=alice%40test.com&password=new-secret-1",
    )
    .await;
    assert_eq!(new.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&new).as_deref(), Some("/"));
}

/// Resetting the password forces re-login everywhere: sessions from before
/// the reset are invalidated.
#[sqlx::test(migrations = "../db/migrations")]
async fn reset_invalidates_existing_sessions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let cookies = register(app.clone(), "Alice", "alice@test.com", "old-secret").await;
    let header = auth_cookie_header(&cookies);

    let user = UserRepo::find_by_email(&pool, "alice@test.com")
        .await
        .unwrap()
        .unwrap();
    let generated = generate_reset_token();
    PasswordResetRepo::replace_for_user(&pool, user.id, &generated.hash)
        .await
        .unwrap();

    let redeem = post_form(
        app.clone(),
        &format!("/reset-password/{}", generated.plaintext),
        "new_password=new-secret-1&confirm_password=new-secret-1",
    )
    .await;
    assert_eq!(redeem.status(), StatusCode::SEE_OTHER);

    let me = get_with_cookies(app, "/me", &header).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// Identity endpoints require authentication.
#[sqlx::test(migrations = "../db/migrations")]
async fn identity_endpoints_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let me = get(app.clone(), "/me").await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let profile = get(app, "/profile").await;
    assert_eq!(profile.status(), StatusCode::UNAUTHORIZED);
}
