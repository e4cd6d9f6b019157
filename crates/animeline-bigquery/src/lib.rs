//! Animeline BigQuery - warehouse sink
//!
//! Appends row batches to a BigQuery table over the v2 REST API. Append is
//! the production path; replace truncates first. Atomicity is whatever the
//! destination guarantees; there is no transaction or rollback logic here.

pub mod loader;
pub mod table;

// Re-exports
pub use loader::{BigQueryLoader, LoadError, LoadResult, WriteToken};
pub use table::{TableRef, WriteMode};
