//! Long-running background tasks, spawned via `tokio::spawn`. All tasks
//! accept a [`tokio_util::sync::CancellationToken`] so graceful shutdown
//! can stop them deterministically.

pub mod session_reaper;
