//! Shared domain primitives for the snaplink backend.
//!
//! This crate has no internal dependencies so its contents (id/timestamp
//! aliases, the error taxonomy, and token/digest helpers) can be used by both
//! the data layer and the API server.

pub mod error;
pub mod hashing;
pub mod tokens;
pub mod types;
