//! MAL ranking endpoint client

use animeline_core::{SHARED_RUNTIME, http_client, snippet};
use serde::Serialize;

use crate::model::{RankingPage, RawAnime};

/// Production ranking endpoint.
pub const RANKING_URL: &str = "https://api.myanimelist.net/v2/anime/ranking";

/// Records requested per ranking page.
pub const PAGE_LIMIT: u32 = 50;

/// Field list requested from the ranking endpoint.
pub const RANKING_FIELDS: &str = "id,title,mean,rank,popularity,num_list_users,\
num_scoring_users,status,start_date,end_date,num_episodes,genres,studios";

/// Ranking views the pipeline pulls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingCategory {
    All,
    Airing,
    Upcoming,
}

impl RankingCategory {
    /// The fixed set processed per run, in order.
    pub const RUN_SET: [Self; 3] = [Self::All, Self::Airing, Self::Upcoming];

    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "airing" => Some(Self::Airing),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }

    /// `ranking_type` query parameter value.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Airing => "airing",
            Self::Upcoming => "upcoming",
        }
    }
}

impl std::fmt::Display for RankingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Failure fetching one ranking category.
///
/// `ExpiredToken` (HTTP 401) is split out so the caller can refresh and retry
/// exactly once; everything else is recoverable only by skipping the category.
#[derive(Debug)]
pub enum FetchError {
    ExpiredToken,
    Http {
        status: Option<u16>,
        message: String,
    },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpiredToken => write!(f, "access token expired"),
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::ExpiredToken)
    }

    fn from_reqwest(e: &reqwest::Error) -> Self {
        let (status, message) = animeline_core::error_parts(e);
        Self::Http { status, message }
    }
}

/// A source of ranking pages. Implemented by the real API client; stubbed
/// in runner tests.
pub trait RankingSource {
    fn fetch(
        &self,
        category: RankingCategory,
        access_token: &str,
    ) -> Result<Vec<RawAnime>, FetchError>;
}

/// MAL ranking API client.
pub struct MalRankingApi {
    base_url: String,
}

impl MalRankingApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, category: RankingCategory) -> String {
        format!(
            "{}?ranking_type={}&limit={}&fields={}",
            self.base_url,
            category.api_name(),
            PAGE_LIMIT,
            RANKING_FIELDS
        )
    }
}

impl Default for MalRankingApi {
    fn default() -> Self {
        Self::new(RANKING_URL)
    }
}

impl RankingSource for MalRankingApi {
    fn fetch(
        &self,
        category: RankingCategory,
        access_token: &str,
    ) -> Result<Vec<RawAnime>, FetchError> {
        let url = self.request_url(category);
        SHARED_RUNTIME.handle().block_on(async {
            let resp = http_client()
                .get(&url)
                .bearer_auth(access_token)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;

            let status = resp.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(FetchError::ExpiredToken);
            }
            let body = resp.text().await.map_err(|e| FetchError::from_reqwest(&e))?;
            if !status.is_success() {
                return Err(FetchError::Http {
                    status: Some(status.as_u16()),
                    message: snippet(&body),
                });
            }

            let page: RankingPage = serde_json::from_str(&body).map_err(|e| FetchError::Http {
                status: None,
                message: format!("invalid ranking response: {e}"),
            })?;
            Ok(page.data.into_iter().map(|entry| entry.node).collect())
        })
    }
}
