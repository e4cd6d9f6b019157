//! Wire model for the MAL ranking endpoint

use serde::Deserialize;

/// Ranking response: a `data` array of `{node}` wrappers.
#[derive(Debug, Deserialize)]
pub struct RankingPage {
    #[serde(default)]
    pub data: Vec<RankingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RankingEntry {
    pub node: RawAnime,
}

/// One anime as the API returns it, before flattening.
///
/// Every scalar is optional: the endpoint omits fields freely (upcoming shows
/// carry no mean, rank is absent outside ranked views). Absent stays absent
/// here; nothing is defaulted to zero or empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnime {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub mean: Option<f64>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
    pub num_list_users: Option<i64>,
    pub num_scoring_users: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub num_episodes: Option<i64>,
    #[serde(default)]
    pub genres: Vec<NamedEntity>,
    #[serde(default)]
    pub studios: Vec<NamedEntity>,
}

/// Genre or studio reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedEntity {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}
