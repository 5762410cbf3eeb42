//! Handlers for password management: change, set (for social-login
//! accounts), forgot, and reset-by-token.

use axum::extract::{Form, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use snaplink_core::error::CoreError;
use snaplink_db::repositories::{PasswordResetRepo, SessionRepo, UserRepo};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::verification::{find_password_reset, issue_password_reset};
use crate::cookies::clear_token_cookies;
use crate::error::{AppError, AppResult};
use crate::flash::flash_redirect;
use crate::handlers::validation_message;
use crate::middleware::auth::OptionalUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Flashed for both known and unknown addresses so the forgot-password flow
/// cannot be used to probe which emails are registered.
const RESET_LINK_SENT: &str = "If an account exists for that email, a reset link has been sent";

const WRONG_CURRENT_PASSWORD: &str = "Current password is incorrect";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Form body for `POST /change-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordForm {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(
        length(min = 6, max = 100, message = "New password must be between 6 and 100 characters"),
        must_match(other = "confirm_password", message = "Passwords do not match")
    )]
    pub new_password: String,
    pub confirm_password: String,
}

/// Form body for `POST /set-password` and `POST /reset-password/{token}`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordForm {
    #[validate(
        length(min = 6, max = 100, message = "New password must be between 6 and 100 characters"),
        must_match(other = "confirm_password", message = "Passwords do not match")
    )]
    pub new_password: String,
    pub confirm_password: String,
}

/// Form body for `POST /reset-password` (the forgot-password submission).
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

/// Probe result for `GET /reset-password/{token}`.
#[derive(Debug, Serialize)]
pub struct ResetTokenProbe {
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /change-password
///
/// Requires the current password before accepting a new one.
pub async fn change_password(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<Response> {
    let Some(user) = current else {
        return Ok(Redirect::to("/login").into_response());
    };

    if let Err(errors) = form.validate() {
        return Ok(
            flash_redirect(jar, &validation_message(&errors), "/change-password").into_response(),
        );
    }

    let db_user = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id,
        }))?;

    // A social-only account has no current password to verify; same outcome
    // as a wrong guess.
    let verified = db_user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&form.current_password, hash));

    if !verified {
        return Ok(flash_redirect(jar, WRONG_CURRENT_PASSWORD, "/change-password").into_response());
    }

    let new_hash = hash_password(&form.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    UserRepo::update_password(&state.pool, db_user.id, &new_hash).await?;
    tracing::info!(user_id = db_user.id, "Password changed");

    Ok(Redirect::to("/profile").into_response())
}

/// POST /set-password
///
/// Lets a social-login account add a password. Rejected when one exists;
/// that is what change-password is for.
pub async fn set_password(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
    Form(form): Form<NewPasswordForm>,
) -> AppResult<Response> {
    let Some(user) = current else {
        return Ok(Redirect::to("/").into_response());
    };

    if let Err(errors) = form.validate() {
        return Ok(
            flash_redirect(jar, &validation_message(&errors), "/set-password").into_response(),
        );
    }

    let db_user = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id,
        }))?;

    if db_user.has_password() {
        return Ok(flash_redirect(
            jar,
            "You already have a password. Change it instead.",
            "/set-password",
        )
        .into_response());
    }

    let new_hash = hash_password(&form.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    UserRepo::update_password(&state.pool, db_user.id, &new_hash).await?;
    tracing::info!(user_id = db_user.id, "Password set for social-login account");

    Ok(Redirect::to("/profile").into_response())
}

/// POST /reset-password
///
/// Forgot-password submission. The response is identical whether or not the
/// email is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ForgotPasswordForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(
            flash_redirect(jar, &validation_message(&errors), "/reset-password").into_response(),
        );
    }

    if let Some(user) = UserRepo::find_by_email(&state.pool, &form.email).await? {
        // Even a storage failure must not change the client-visible outcome.
        if let Err(e) = issue_password_reset(&state, user.id, &user.name, &user.email).await {
            tracing::error!(error = %e, user_id = user.id, "Failed to issue password reset");
        }
    }

    Ok(flash_redirect(jar, RESET_LINK_SENT, "/reset-password").into_response())
}

/// GET /reset-password/{token}
///
/// Probe whether a reset token is still redeemable (the rendering layer
/// shows the new-password form only when it is). Does not consume the token.
pub async fn reset_password_probe(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(token): Path<String>,
) -> AppResult<Response> {
    if find_password_reset(&state, &token).await?.is_none() {
        return Ok(flash_redirect(
            jar,
            "Password reset link is invalid or expired",
            "/reset-password",
        )
        .into_response());
    }

    Ok(Json(DataResponse {
        data: ResetTokenProbe { valid: true },
    })
    .into_response())
}

/// POST /reset-password/{token}
///
/// Redeem a reset token: update the password and delete the token in one
/// transaction (so a token is spendable exactly once), then invalidate all
/// of the user's sessions and force a fresh login.
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(token): Path<String>,
    Form(form): Form<NewPasswordForm>,
) -> AppResult<Response> {
    let Some(record) = find_password_reset(&state, &token).await? else {
        return Ok(flash_redirect(
            jar,
            "Password reset link is invalid or expired",
            "/reset-password",
        )
        .into_response());
    };

    if let Err(errors) = form.validate() {
        let back = format!("/reset-password/{token}");
        return Ok(flash_redirect(jar, &validation_message(&errors), &back).into_response());
    }

    let new_hash = hash_password(&form.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    PasswordResetRepo::consume_and_set_password(&state.pool, record.user_id, &new_hash).await?;

    // Outstanding sessions were authenticated with the old credential.
    SessionRepo::invalidate_all_for_user(&state.pool, record.user_id).await?;
    tracing::info!(user_id = record.user_id, "Password reset; sessions invalidated");

    let jar = clear_token_cookies(jar);
    Ok((jar, Redirect::to("/login")).into_response())
}
