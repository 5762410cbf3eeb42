//! Route definitions for the OAuth login flows.

use axum::routing::get;
use axum::Router;

use crate::handlers::oauth;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// GET /google            -> start Google flow
/// GET /google/callback   -> Google code exchange
/// GET /github            -> start GitHub flow
/// GET /github/callback   -> GitHub code exchange
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", get(oauth::google_login))
        .route("/google/callback", get(oauth::google_callback))
        .route("/github", get(oauth::github_login))
        .route("/github/callback", get(oauth::github_callback))
}
