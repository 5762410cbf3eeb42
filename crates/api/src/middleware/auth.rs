//! Cookie-based authentication extractors for Axum handlers.
//!
//! A valid access token alone is not enough to authenticate: the session it
//! references must still exist and be marked valid, so logging out revokes
//! outstanding tokens immediately rather than at JWT expiry.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use snaplink_core::error::CoreError;
use snaplink_core::types::DbId;
use snaplink_db::repositories::SessionRepo;

use crate::auth::jwt::validate_access_token;
use crate::cookies::ACCESS_TOKEN_COOKIE;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `access_token` cookie.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The session this request authenticated against.
    pub session_id: DbId,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar.get(ACCESS_TOKEN_COOKIE).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Not logged in".into()))
        })?;

        let claims = validate_access_token(token.value(), &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        // Token possession is insufficient on its own: the referenced session
        // must still be valid.
        let session = SessionRepo::find_by_id(&state.pool, claims.sid)
            .await?
            .filter(|s| s.valid)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Session is no longer valid".into()))
            })?;

        Ok(CurrentUser {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            session_id: session.id,
        })
    }
}

/// Optional variant of [`CurrentUser`] for handlers that change behaviour
/// based on login state (e.g. redirecting authenticated users away from
/// auth pages) instead of rejecting anonymous requests.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            // Database failures still propagate; auth failures mean "anonymous".
            Err(AppError::Database(e)) => Err(AppError::Database(e)),
            Err(_) => Ok(OptionalUser(None)),
        }
    }
}
