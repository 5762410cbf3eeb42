//! Handlers for the email verification flow.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use snaplink_core::error::CoreError;
use snaplink_db::repositories::UserRepo;

use crate::auth::verification::{consume_email_verification, issue_email_verification};
use crate::error::{AppError, AppResult};
use crate::flash::flash_redirect;
use crate::middleware::auth::OptionalUser;
use crate::state::AppState;

/// Uniform failure message; unknown code, wrong email, and expiry are
/// indistinguishable to the caller.
const INVALID_OR_EXPIRED: &str = "Verification link is invalid or expired";

/// Query parameters of the emailed verification link.
///
/// Both fields are optional at the type level so malformed links get the
/// uniform failure message instead of a bare 400.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
    pub email: Option<String>,
}

/// GET /verify-email-token?token=..&email=..
///
/// Consume a verification code from the emailed link.
pub async fn verify_email_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<VerifyEmailQuery>,
) -> AppResult<Response> {
    let (Some(token), Some(email)) = (query.token, query.email) else {
        return Ok(flash_redirect(jar, INVALID_OR_EXPIRED, "/").into_response());
    };

    // Codes are exactly 8 digits; anything else cannot match.
    if token.len() != 8 || !token.chars().all(|c| c.is_ascii_digit()) {
        return Ok(flash_redirect(jar, INVALID_OR_EXPIRED, "/").into_response());
    }

    match consume_email_verification(&state, &token, &email).await {
        Ok(()) => Ok(Redirect::to("/profile").into_response()),
        Err(AppError::Core(CoreError::Unauthorized(_))) => {
            Ok(flash_redirect(jar, INVALID_OR_EXPIRED, "/").into_response())
        }
        Err(e) => Err(e),
    }
}

/// POST /resend-verification-link
///
/// Issue a fresh code for the logged-in user. Replaces (and thereby
/// invalidates) any previously issued code. No-op redirect when the email
/// is already verified.
pub async fn resend_verification_link(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let Some(user) = current else {
        return Ok(Redirect::to("/").into_response());
    };

    let Some(db_user) = UserRepo::find_by_id(&state.pool, user.user_id).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    if db_user.is_email_valid {
        return Ok(Redirect::to("/").into_response());
    }

    issue_email_verification(&state, db_user.id, &db_user.email).await?;

    Ok((jar, Redirect::to("/verify-email")).into_response())
}
