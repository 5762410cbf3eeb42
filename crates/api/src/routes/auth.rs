//! Route definitions for the credential auth, verification, password, and
//! profile flows.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, password, profile, verification};
use crate::state::AppState;

/// Routes mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me))
        .route(
            "/profile",
            get(profile::profile).patch(profile::edit_profile),
        )
        .route("/verify-email-token", get(verification::verify_email_token))
        .route(
            "/resend-verification-link",
            post(verification::resend_verification_link),
        )
        .route("/change-password", post(password::change_password))
        .route("/set-password", post(password::set_password))
        .route("/reset-password", post(password::forgot_password))
        .route(
            "/reset-password/{token}",
            get(password::reset_password_probe).post(password::reset_password),
        )
}
