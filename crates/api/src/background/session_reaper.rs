//! Periodic cleanup of invalidated sessions.
//!
//! Logout and forced re-login soft-invalidate sessions (`valid = false`)
//! so they remain visible for a retention window; this task deletes rows
//! past that window. Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use snaplink_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Default retention for invalidated sessions: 7 days.
const DEFAULT_RETENTION_HOURS: i64 = 24 * 7;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the session reaper loop.
///
/// Deletes invalidated sessions last touched more than `retention_hours`
/// ago (defaults to 7 days). Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let retention_hours: i64 = std::env::var("SESSION_RETENTION_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RETENTION_HOURS);

    tracing::info!(
        retention_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session reaper started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session reaper stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::hours(retention_hours);
                match SessionRepo::delete_invalidated_before(&pool, cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session reaper: purged invalidated sessions");
                        } else {
                            tracing::debug!("Session reaper: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session reaper: cleanup failed");
                    }
                }
            }
        }
    }
}
