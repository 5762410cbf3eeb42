//! Handlers for credential registration, login, logout, and token refresh.

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use snaplink_core::error::CoreError;
use snaplink_core::types::DbId;
use snaplink_db::models::user::CreateUser;
use snaplink_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{establish_session, refresh_session};
use crate::auth::verification::issue_email_verification;
use crate::cookies::{clear_token_cookies, set_token_cookies, REFRESH_TOKEN_COOKIE};
use crate::error::{AppError, AppResult};
use crate::flash::flash_redirect;
use crate::handlers::validation_message;
use crate::middleware::auth::{CurrentUser, OptionalUser};
use crate::middleware::client::ClientInfo;
use crate::response::DataResponse;
use crate::state::AppState;

/// Generic credential-failure message. Unknown email and wrong password both
/// map here so the response does not reveal which one it was.
const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Distinct message for accounts that only have a social login. A deliberate
/// minor enumeration trade-off: telling the user to use their social account
/// beats a dead-end generic failure.
const SOCIAL_ACCOUNT_ONLY: &str =
    "This account was created with a social login. Please log in with your social account.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Form body for `POST /register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: String,
    #[validate(
        email(message = "Please enter a valid email address"),
        length(max = 100, message = "Email must be no more than 100 characters")
    )]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 100,
        message = "Password must be between 6 and 100 characters"
    ))]
    pub password: String,
}

/// Form body for `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "Password is required"))]
    pub password: String,
}

/// Identity payload for `GET /me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /register
///
/// Create a credential account, authenticate it immediately, and kick off
/// email verification.
pub async fn register(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    client: ClientInfo,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    // Already-authenticated users have no business on auth pages.
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if let Err(errors) = form.validate() {
        return Ok(flash_redirect(jar, &validation_message(&errors), "/register").into_response());
    }

    if UserRepo::find_by_email(&state.pool, &form.email).await?.is_some() {
        return Ok(flash_redirect(jar, "User Already Exists", "/register").into_response());
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: form.name,
            email: form.email,
            password_hash: Some(password_hash),
            avatar_url: None,
            is_email_valid: false,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    let jar = establish_session(&state, jar, user.id, &user.name, &user.email, &client).await?;

    // Verification is advisory; a failure here must not undo a successful
    // registration.
    if let Err(e) = issue_email_verification(&state, user.id, &user.email).await {
        tracing::error!(error = %e, user_id = user.id, "Failed to issue verification email");
    }

    Ok((jar, Redirect::to("/")).into_response())
}

/// POST /login
///
/// Authenticate with email + password and establish a fresh session.
pub async fn login(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    client: ClientInfo,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if let Err(errors) = form.validate() {
        return Ok(flash_redirect(jar, &validation_message(&errors), "/login").into_response());
    }

    let Some(user) = UserRepo::find_by_email(&state.pool, &form.email).await? else {
        return Ok(flash_redirect(jar, INVALID_CREDENTIALS, "/login").into_response());
    };

    let Some(password_hash) = &user.password_hash else {
        return Ok(flash_redirect(jar, SOCIAL_ACCOUNT_ONLY, "/login").into_response());
    };

    if !verify_password(&form.password, password_hash) {
        return Ok(flash_redirect(jar, INVALID_CREDENTIALS, "/login").into_response());
    }

    let jar = establish_session(&state, jar, user.id, &user.name, &user.email, &client).await?;

    Ok((jar, Redirect::to("/")).into_response())
}

/// POST /logout
///
/// Invalidate the current session and drop both token cookies. Idempotent:
/// an anonymous caller just gets the same redirect.
pub async fn logout(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(user) = current {
        SessionRepo::invalidate(&state.pool, user.session_id).await?;
        tracing::info!(user_id = user.user_id, session_id = user.session_id, "Logged out");
    }

    let jar = clear_token_cookies(jar);
    Ok((jar, Redirect::to("/")).into_response())
}

/// POST /refresh
///
/// Exchange the refresh-token cookie for a rotated access/refresh pair.
/// The session id is unchanged; only the token material rotates.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Response> {
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Missing refresh token".into())))?;

    let rotated = refresh_session(&state, &token).await?;

    let user = rotated.user;
    let jar = set_token_cookies(
        jar,
        rotated.access_token,
        rotated.refresh_token,
        &state.config.jwt,
        state.config.secure_cookies,
    );

    Ok((jar, Json(DataResponse { data: user })).into_response())
}

/// GET /me
///
/// Identity of the calling user, straight from the verified access token.
pub async fn me(user: CurrentUser) -> Json<DataResponse<MeResponse>> {
    Json(DataResponse {
        data: MeResponse {
            id: user.user_id,
            name: user.name,
            email: user.email,
        },
    })
}
