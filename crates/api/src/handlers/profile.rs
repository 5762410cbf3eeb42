//! Profile handlers: the authenticated user's details plus their short
//! links (read from the shortener's table, scoped by owner).

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use axum_extra::extract::cookie::CookieJar;
use snaplink_core::error::CoreError;
use snaplink_db::models::short_link::ShortLink;
use snaplink_db::models::user::{UpdateProfile, UserResponse};
use snaplink_db::repositories::{ShortLinkRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::flash::flash_redirect;
use crate::handlers::validation_message;
use crate::middleware::auth::{CurrentUser, OptionalUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Payload for `GET /profile`.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub links: Vec<ShortLink>,
}

/// Form body for `PATCH /profile`.
#[derive(Debug, Deserialize, Validate)]
pub struct EditProfileForm {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: String,
    pub avatar_url: Option<String>,
}

/// GET /profile
///
/// The full profile (verified flag, password presence, avatar) plus the
/// user's short links.
pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    let db_user = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id,
        }))?;

    let links = ShortLinkRepo::list_for_user(&state.pool, db_user.id).await?;

    Ok(Json(DataResponse {
        data: ProfileResponse {
            user: db_user.into(),
            links,
        },
    }))
}

/// PATCH /profile
///
/// Update display name and, optionally, the avatar URL.
pub async fn edit_profile(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
    Form(form): Form<EditProfileForm>,
) -> AppResult<Response> {
    let Some(user) = current else {
        return Ok(Redirect::to("/").into_response());
    };

    if let Err(errors) = form.validate() {
        return Ok(
            flash_redirect(jar, &validation_message(&errors), "/edit-profile").into_response(),
        );
    }

    UserRepo::update_profile(
        &state.pool,
        user.user_id,
        &UpdateProfile {
            name: Some(form.name),
            avatar_url: form.avatar_url,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "user",
        id: user.user_id,
    }))?;

    Ok(Redirect::to("/profile").into_response())
}
