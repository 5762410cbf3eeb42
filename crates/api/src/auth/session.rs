//! Session establishment and refresh-token rotation.
//!
//! Every successful authentication event (login, register, OAuth callback)
//! funnels through [`establish_session`]: create a session row, mint the
//! access/refresh token pair against it, and hand both to the cookie
//! transport. Refresh rotates token material only -- the session id is
//! stable for the lifetime of the session.

use axum_extra::extract::cookie::CookieJar;
use snaplink_core::error::CoreError;
use snaplink_core::types::DbId;
use snaplink_db::models::session::CreateSession;
use snaplink_db::models::user::UserResponse;
use snaplink_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, validate_refresh_token};
use crate::cookies::set_token_cookies;
use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientInfo;
use crate::state::AppState;

/// The result of a successful refresh-token rotation.
pub struct RotatedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
    /// Stable across the rotation.
    pub session_id: DbId,
}

/// Create a session for the user and return a jar with both token cookies set.
pub async fn establish_session(
    state: &AppState,
    jar: CookieJar,
    user_id: DbId,
    name: &str,
    email: &str,
    client: &ClientInfo,
) -> AppResult<CookieJar> {
    let session = SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
        },
    )
    .await?;

    let access_token = generate_access_token(user_id, name, email, session.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh_token = generate_refresh_token(session.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id, session_id = session.id, "Session established");

    Ok(set_token_cookies(
        jar,
        access_token,
        refresh_token,
        &state.config.jwt,
        state.config.secure_cookies,
    ))
}

/// Exchange a refresh token for a new access/refresh pair.
///
/// Fails with `Unauthorized` when the token does not verify, the session is
/// missing or invalidated, or the owning user no longer exists. The new
/// tokens are bound to the *same* session id.
pub async fn refresh_session(state: &AppState, refresh_token: &str) -> AppResult<RotatedTokens> {
    let claims = validate_refresh_token(refresh_token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired refresh token".into()))
    })?;

    let session = SessionRepo::find_by_id(&state.pool, claims.sid)
        .await?
        .filter(|s| s.valid)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Session is no longer valid".into()))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;

    let access_token =
        generate_access_token(user.id, &user.name, &user.email, session.id, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let new_refresh_token = generate_refresh_token(session.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::debug!(user_id = user.id, session_id = session.id, "Tokens rotated");

    Ok(RotatedTokens {
        access_token,
        refresh_token: new_refresh_token,
        user: user.into(),
        session_id: session.id,
    })
}
