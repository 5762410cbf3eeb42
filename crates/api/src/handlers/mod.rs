//! Request handlers.
//!
//! Browser-facing flows answer anticipated failures with a redirect plus a
//! one-shot flash cookie (see [`crate::flash`]); only unanticipated errors
//! surface through [`crate::error::AppError`]. JSON endpoints (`/me`,
//! `/profile`, `/refresh`) use the `{ "data": ... }` envelope.

pub mod auth;
pub mod oauth;
pub mod password;
pub mod profile;
pub mod verification;

/// Extract the first human-readable message from a validation failure.
///
/// Browser flows flash a single field-level message at a time, mirroring
/// one-error-at-a-time form feedback.
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}
