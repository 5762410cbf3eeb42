//! Integration tests for OAuth account linkage.

use snaplink_db::models::oauth_account::OAuthProvider;
use snaplink_db::models::user::{CreateUser, User};
use snaplink_db::repositories::{OAuthAccountRepo, UserRepo};
use sqlx::PgPool;

async fn create_password_user(pool: &PgPool, email: &str, avatar: Option<&str>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Password User".to_string(),
            email: email.to_string(),
            password_hash: Some("$argon2id$existing-hash".to_string()),
            avatar_url: avatar.map(str::to_string),
            is_email_valid: true,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Linking a provider to an existing password account preserves the
/// password and backfills a missing avatar.
#[sqlx::test]
async fn linking_preserves_password_and_backfills_avatar(pool: PgPool) {
    let user = create_password_user(&pool, "link@test.com", None).await;

    let unlinked =
        OAuthAccountRepo::find_user_with_link(&pool, "link@test.com", OAuthProvider::Google)
            .await
            .unwrap()
            .unwrap();
    assert!(unlinked.provider_account_id.is_none());

    OAuthAccountRepo::link(
        &pool,
        user.id,
        OAuthProvider::Google,
        "google-123",
        Some("https://avatars.test/pic.png"),
    )
    .await
    .unwrap();

    let linked =
        OAuthAccountRepo::find_user_with_link(&pool, "link@test.com", OAuthProvider::Google)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(linked.provider_account_id.as_deref(), Some("google-123"));
    assert_eq!(
        linked.avatar_url.as_deref(),
        Some("https://avatars.test/pic.png")
    );

    // The password credential survives the link.
    let after = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(after.password_hash.as_deref(), Some("$argon2id$existing-hash"));
}

/// An avatar the user already has is never overwritten by a provider's.
#[sqlx::test]
async fn linking_never_overwrites_existing_avatar(pool: PgPool) {
    let user = create_password_user(&pool, "avatar@test.com", Some("https://mine.test/me.png")).await;

    OAuthAccountRepo::link(
        &pool,
        user.id,
        OAuthProvider::Github,
        "github-42",
        Some("https://github.test/other.png"),
    )
    .await
    .unwrap();

    let after = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(after.avatar_url.as_deref(), Some("https://mine.test/me.png"));
}

/// A provider-created user is email-verified from the start and linked.
#[sqlx::test]
async fn create_user_with_link_is_preverified(pool: PgPool) {
    let user = OAuthAccountRepo::create_user_with_link(
        &pool,
        "OAuth User",
        "new-oauth@test.com",
        Some("https://avatars.test/new.png"),
        OAuthProvider::Google,
        "google-456",
    )
    .await
    .unwrap();

    assert!(user.is_email_valid, "provider-verified email");
    assert!(user.password_hash.is_none(), "no password credential");

    let linked =
        OAuthAccountRepo::find_user_with_link(&pool, "new-oauth@test.com", OAuthProvider::Google)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(linked.provider_account_id.as_deref(), Some("google-456"));
}

/// When the link insert fails, the user insert rolls back with it.
#[sqlx::test]
async fn create_user_with_link_is_atomic(pool: PgPool) {
    OAuthAccountRepo::create_user_with_link(
        &pool,
        "First",
        "first@test.com",
        None,
        OAuthProvider::Github,
        "github-dup",
    )
    .await
    .unwrap();

    // Same provider account id violates the unique constraint mid-transaction.
    let result = OAuthAccountRepo::create_user_with_link(
        &pool,
        "Second",
        "second@test.com",
        None,
        OAuthProvider::Github,
        "github-dup",
    )
    .await;
    assert!(result.is_err());

    // No orphaned half-created user.
    let orphan = UserRepo::find_by_email(&pool, "second@test.com").await.unwrap();
    assert!(orphan.is_none(), "failed linkage must not leave a user behind");
}

/// At most one linked account per (user, provider).
#[sqlx::test]
async fn one_link_per_user_and_provider(pool: PgPool) {
    let user = create_password_user(&pool, "double@test.com", None).await;

    OAuthAccountRepo::link(&pool, user.id, OAuthProvider::Google, "google-a", None)
        .await
        .unwrap();

    let second = OAuthAccountRepo::link(&pool, user.id, OAuthProvider::Google, "google-b", None).await;
    assert!(second.is_err(), "composite unique constraint must reject");
}
