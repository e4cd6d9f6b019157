//! Animeline Core - Common infrastructure for the ranking pipeline
//!
//! This crate provides the pooled HTTP client and shared runtime backing
//! the sync-facing source and sink crates, plus logging setup.

pub mod http;
pub mod logging;

// Re-exports for convenience
pub use http::{SHARED_RUNTIME, error_parts, http_client, snippet};
pub use logging::init_logging;
