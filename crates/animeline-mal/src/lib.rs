//! Animeline MAL - MyAnimeList ranking source
//!
//! Fetches the anime ranking endpoint per category, recovers from OAuth
//! token expiry, and flattens the nested records into warehouse rows
//! (one row per anime/category/genre combination).
//!
//! # Example
//!
//! ```ignore
//! use animeline_mal::{Credential, MalRankingApi, MalTokenEndpoint, RankingCategory, TokenManager};
//!
//! let mut tokens = TokenManager::new(credential, Box::new(MalTokenEndpoint::default()));
//! let api = MalRankingApi::default();
//! let extraction = animeline_mal::extract(&api, &mut tokens, &RankingCategory::RUN_SET)?;
//! let rows = animeline_mal::transform(&extraction.pages[0].records, RankingCategory::All, today);
//! ```

pub mod api;
pub mod auth;
pub mod model;
pub mod runner;
pub mod transform;

// Re-exports
pub use api::{FetchError, MalRankingApi, RankingCategory, RankingSource};
pub use auth::{AuthRefreshError, Credential, MalTokenEndpoint, TokenExchange, TokenManager};
pub use model::RawAnime;
pub use runner::{CategoryOutcome, CategoryPage, CategoryReport, Extraction, extract};
pub use transform::{NormalizedRow, ScoreBucket, transform};
