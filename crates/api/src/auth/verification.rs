//! Email verification and password-reset token management.
//!
//! Issuance persists the token (transactionally where replacement matters)
//! and then dispatches the email on a detached task -- the triggering
//! request never waits on, or fails because of, the SMTP relay.

use snaplink_core::error::CoreError;
use snaplink_core::tokens::{generate_reset_token, generate_verification_code, hash_reset_token};
use snaplink_core::types::DbId;
use snaplink_db::models::password_reset::PasswordResetToken;
use snaplink_db::repositories::{EmailVerificationRepo, PasswordResetRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::mailer::spawn_send;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Link construction
// ---------------------------------------------------------------------------

/// Build the emailed verification link, with token and email as query params.
pub fn verification_link(base_url: &str, token: &str, email: &str) -> String {
    let mut url = reqwest::Url::parse(base_url)
        .unwrap_or_else(|_| reqwest::Url::parse("http://localhost:3000").unwrap());
    url.set_path("/verify-email-token");
    url.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("email", email);
    url.to_string()
}

/// Build the emailed password-reset link, with the raw token as a path segment.
pub fn reset_password_link(base_url: &str, raw_token: &str) -> String {
    format!("{}/reset-password/{raw_token}", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Email bodies
// ---------------------------------------------------------------------------

fn verification_email_html(code: &str, link: &str) -> String {
    format!(
        "<p>Your email verification code is <strong>{code}</strong>.</p>\
         <p>You can also verify directly by clicking <a href=\"{link}\">this link</a>.</p>\
         <p>The code expires in 24 hours.</p>"
    )
}

fn reset_email_html(name: &str, link: &str) -> String {
    format!(
        "<p>Hi {name},</p>\
         <p><a href=\"{link}\">Click here to reset your password</a>. \
         The link expires in 1 hour.</p>\
         <p>If you did not request this, you can ignore this email.</p>"
    )
}

// ---------------------------------------------------------------------------
// Email verification
// ---------------------------------------------------------------------------

/// Issue a fresh email verification code and dispatch it.
///
/// Replacing the stored code happens in one transaction (expired purge,
/// per-user purge, insert), so at most one code per user is ever active.
/// The email itself is fire-and-forget.
pub async fn issue_email_verification(
    state: &AppState,
    user_id: DbId,
    email: &str,
) -> AppResult<()> {
    let code = generate_verification_code();

    EmailVerificationRepo::replace_for_user(&state.pool, user_id, &code).await?;

    let link = verification_link(&state.config.public_base_url, &code, email);
    let html = verification_email_html(&code, &link);

    spawn_send(
        state.mailer.clone(),
        email.to_string(),
        "Verify Your Email".to_string(),
        html,
    );

    tracing::info!(user_id, "Verification code issued");
    Ok(())
}

/// Consume a verification code presented via the emailed link.
///
/// On a match, flips the user's verified flag and purges their remaining
/// codes on a best-effort detached task. Any miss (unknown code, wrong
/// email, expired) is the same uniform `Unauthorized`.
pub async fn consume_email_verification(
    state: &AppState,
    token: &str,
    email: &str,
) -> AppResult<()> {
    let matched = EmailVerificationRepo::find_valid(&state.pool, token, email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Verification link is invalid or expired".into(),
            ))
        })?;

    UserRepo::mark_email_valid(&state.pool, &matched.email).await?;

    // Cleanup is best-effort; a failure leaves only rows the expiry purge
    // will catch on the next issuance.
    let pool = state.pool.clone();
    let user_id = matched.user_id;
    tokio::spawn(async move {
        if let Err(e) = EmailVerificationRepo::delete_all_for_user(&pool, user_id).await {
            tracing::error!(error = %e, user_id, "Failed to clear verification tokens");
        }
    });

    tracing::info!(user_id = matched.user_id, "Email verified");
    Ok(())
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// Issue a password-reset token for the user and dispatch the reset email.
///
/// Only the SHA-256 digest of the token is stored; the raw token exists
/// solely inside the emailed link.
pub async fn issue_password_reset(state: &AppState, user_id: DbId, name: &str, email: &str) -> AppResult<()> {
    let generated = generate_reset_token();

    PasswordResetRepo::replace_for_user(&state.pool, user_id, &generated.hash).await?;

    let link = reset_password_link(&state.config.public_base_url, &generated.plaintext);
    let html = reset_email_html(name, &link);

    spawn_send(
        state.mailer.clone(),
        email.to_string(),
        "Reset Your Password".to_string(),
        html,
    );

    tracing::info!(user_id, "Password reset token issued");
    Ok(())
}

/// Look up the reset record for a presented raw token.
///
/// Hashes the token and matches by digest with an unexpired row. Returns
/// `None` on any miss; the caller decides how to surface that. Consumption
/// (delete + password update, atomically) is a separate step so a probe does
/// not spend the token.
pub async fn find_password_reset(
    state: &AppState,
    raw_token: &str,
) -> AppResult<Option<PasswordResetToken>> {
    let hash = hash_reset_token(raw_token);
    Ok(PasswordResetRepo::find_valid_by_hash(&state.pool, &hash).await?)
}
