use std::sync::Arc;

use crate::config::ServerConfig;
use crate::mailer::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: snaplink_db::DbPool,
    /// Server configuration (JWT secret, OAuth credentials, base URLs).
    pub config: Arc<ServerConfig>,
    /// SMTP mailer; `None` when email delivery is not configured.
    pub mailer: Option<Arc<Mailer>>,
    /// Shared HTTP client for outbound OAuth provider calls.
    ///
    /// Built with an explicit timeout so a slow provider cannot pin a
    /// request task indefinitely.
    pub http: reqwest::Client,
}
