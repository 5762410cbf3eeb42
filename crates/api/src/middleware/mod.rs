//! Request extractors: authenticated-user resolution and client metadata.

pub mod auth;
pub mod client;
