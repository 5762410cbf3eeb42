//! Integration tests for the email verification token lifecycle.

use snaplink_db::models::user::{CreateUser, User};
use snaplink_db::repositories::{EmailVerificationRepo, UserRepo};
use sqlx::PgPool;

/// Insert a user directly and return the row.
async fn create_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: Some("$argon2id$placeholder".to_string()),
            avatar_url: None,
            is_email_valid: false,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Issuing a second code replaces the first: the old code stops matching.
#[sqlx::test]
async fn replacing_a_code_invalidates_the_previous_one(pool: PgPool) {
    let user = create_user(&pool, "replace@test.com").await;

    EmailVerificationRepo::replace_for_user(&pool, user.id, "11111111")
        .await
        .unwrap();
    EmailVerificationRepo::replace_for_user(&pool, user.id, "22222222")
        .await
        .unwrap();

    let old = EmailVerificationRepo::find_valid(&pool, "11111111", "replace@test.com")
        .await
        .unwrap();
    assert!(old.is_none(), "replaced code must no longer match");

    let new = EmailVerificationRepo::find_valid(&pool, "22222222", "replace@test.com")
        .await
        .unwrap();
    assert!(new.is_some(), "fresh code must match");
    assert_eq!(new.unwrap().user_id, user.id);
}

/// An expired code never matches, even with the right token + email.
#[sqlx::test]
async fn expired_code_is_not_consumable(pool: PgPool) {
    let user = create_user(&pool, "expired@test.com").await;

    EmailVerificationRepo::replace_for_user(&pool, user.id, "33333333")
        .await
        .unwrap();

    // Simulate the 24-hour expiry elapsing.
    sqlx::query("UPDATE verify_email_tokens SET expires_at = NOW() - INTERVAL '1 minute' WHERE user_id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let found = EmailVerificationRepo::find_valid(&pool, "33333333", "expired@test.com")
        .await
        .unwrap();
    assert!(found.is_none(), "expired code must not be consumable");
}

/// A code only matches together with its owning user's email.
#[sqlx::test]
async fn code_must_match_owning_email(pool: PgPool) {
    let alice = create_user(&pool, "alice@test.com").await;
    let _bob = create_user(&pool, "bob@test.com").await;

    EmailVerificationRepo::replace_for_user(&pool, alice.id, "44444444")
        .await
        .unwrap();

    let cross = EmailVerificationRepo::find_valid(&pool, "44444444", "bob@test.com")
        .await
        .unwrap();
    assert!(cross.is_none(), "code must not match another user's email");
}

/// Issuance purges globally expired codes, not just the issuing user's.
#[sqlx::test]
async fn issuance_purges_globally_expired_codes(pool: PgPool) {
    let alice = create_user(&pool, "alice2@test.com").await;
    let bob = create_user(&pool, "bob2@test.com").await;

    EmailVerificationRepo::replace_for_user(&pool, alice.id, "55555555")
        .await
        .unwrap();
    sqlx::query("UPDATE verify_email_tokens SET expires_at = NOW() - INTERVAL '1 hour' WHERE user_id = $1")
        .bind(alice.id)
        .execute(&pool)
        .await
        .unwrap();

    // Bob's issuance should sweep Alice's expired row away.
    EmailVerificationRepo::replace_for_user(&pool, bob.id, "66666666")
        .await
        .unwrap();

    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM verify_email_tokens WHERE user_id = $1")
            .bind(alice.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count.0, 0, "expired rows must be purged on any issuance");
}
