//! Flatten raw ranking records into warehouse rows
//!
//! Pure functions, no I/O. One input record becomes one row per genre,
//! all rows sharing the scalar fields and the run's ranking date.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::api::RankingCategory;
use crate::model::{NamedEntity, RawAnime};

/// Discretized band of the mean score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScoreBucket {
    #[serde(rename = "<6")]
    Under6,
    #[serde(rename = "6-6.9")]
    Sixes,
    #[serde(rename = "7-7.9")]
    Sevens,
    #[serde(rename = "8-8.9")]
    Eights,
    #[serde(rename = "9+")]
    NinePlus,
}

impl ScoreBucket {
    /// Band for a mean score. Inclusive lower bound, exclusive upper bound,
    /// except the top band which is closed. Means outside [0, 10] have no band.
    pub fn from_mean(mean: f64) -> Option<Self> {
        if !(0.0..=10.0).contains(&mean) {
            return None;
        }
        Some(match mean {
            m if m < 6.0 => Self::Under6,
            m if m < 7.0 => Self::Sixes,
            m if m < 8.0 => Self::Sevens,
            m if m < 9.0 => Self::Eights,
            _ => Self::NinePlus,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Under6 => "<6",
            Self::Sixes => "6-6.9",
            Self::Sevens => "7-7.9",
            Self::Eights => "8-8.9",
            Self::NinePlus => "9+",
        }
    }
}

impl std::fmt::Display for ScoreBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One warehouse-bound row: a single (anime, category, genre) combination.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRow {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub mean: Option<f64>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
    pub num_list_users: Option<i64>,
    pub num_scoring_users: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub num_episodes: Option<i64>,
    pub studios: Option<String>,
    pub genre: Option<String>,
    pub ranking_type: RankingCategory,
    pub ranking_date: NaiveDate,
    pub start_year: Option<i32>,
    pub score_bucket: Option<ScoreBucket>,
}

/// Flatten one category's records into rows, one per genre.
///
/// `ranking_date` is injected by the orchestrator so the whole batch shares
/// a single value regardless of when each category finished fetching.
pub fn transform(
    records: &[RawAnime],
    ranking_type: RankingCategory,
    ranking_date: NaiveDate,
) -> Vec<NormalizedRow> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let start_date = parse_date(record.start_date.as_deref());
        let genres = joined_names(&record.genres);
        let base = NormalizedRow {
            id: record.id,
            title: record.title.clone(),
            mean: record.mean,
            rank: record.rank,
            popularity: record.popularity,
            num_list_users: record.num_list_users,
            num_scoring_users: record.num_scoring_users,
            status: record.status.clone(),
            start_date,
            end_date: parse_date(record.end_date.as_deref()),
            num_episodes: record.num_episodes,
            studios: joined_names(&record.studios),
            genre: None,
            ranking_type,
            ranking_date,
            start_year: start_date.map(|d| d.year()),
            score_bucket: record.mean.and_then(ScoreBucket::from_mean),
        };
        for genre in explode_genres(genres.as_deref()) {
            rows.push(NormalizedRow {
                genre,
                ..base.clone()
            });
        }
    }
    rows
}

/// Lowercased, trimmed entity names joined with ", ". None when nothing
/// usable remains.
fn joined_names(entities: &[NamedEntity]) -> Option<String> {
    let names: Vec<String> = entities
        .iter()
        .map(|e| e.name.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Split a joined genre string into per-row values, on comma plus optional
/// whitespace. Always yields at least one element so every anime keeps a row.
fn explode_genres(joined: Option<&str>) -> Vec<Option<String>> {
    let Some(joined) = joined else {
        return vec![None];
    };
    let tokens: Vec<Option<String>> = joined
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Some(t.to_string()))
        .collect();
    if tokens.is_empty() {
        vec![None]
    } else {
        tokens
    }
}

/// Strict `YYYY-MM-DD`. MAL also emits partial `YYYY-MM` and bare `YYYY`
/// dates; those carry no real day and come back as None instead of an
/// invented calendar date.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, "%Y-%m-%d").ok()
}
