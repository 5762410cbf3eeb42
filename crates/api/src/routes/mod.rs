//! Route tree.
//!
//! Route hierarchy (all root-level; these are browser-facing flows with
//! cookie transport, so nothing is nested under an `/api` prefix):
//!
//! ```text
//! /health                          service + database health
//!
//! POST /register                   credential registration (public)
//! POST /login                      credential login (public)
//! POST /logout                     invalidate session (idempotent)
//! POST /refresh                    rotate access/refresh tokens
//! GET  /me                         identity from the access token
//!
//! GET  /profile                    full profile + owned short links
//! PATCH /profile                   edit name / avatar
//!
//! GET  /verify-email-token         consume emailed verification code
//! POST /resend-verification-link   reissue verification code
//!
//! POST /change-password            change (requires current password)
//! POST /set-password               add a password to a social account
//! POST /reset-password             forgot-password submission
//! GET  /reset-password/{token}     reset-token probe
//! POST /reset-password/{token}     redeem reset token
//!
//! GET  /google                     start Google flow
//! GET  /google/callback            Google code exchange
//! GET  /github                     start GitHub flow
//! GET  /github/callback            GitHub code exchange
//! ```

pub mod auth;
pub mod health;
pub mod oauth;

use axum::Router;

use crate::state::AppState;

/// Build the full application route tree (no middleware).
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(oauth::router())
}
