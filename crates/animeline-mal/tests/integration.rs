//! Integration tests for animeline-mal
//!
//! These tests hit the real MAL API and require valid credentials in the
//! environment, so they are marked #[ignore] by default.
//! Run with: cargo test -p animeline-mal --test integration -- --ignored

use animeline_mal::{MalRankingApi, RankingCategory, RankingSource};

/// Fetch a single ranking page with a real access token.
/// Requires ACCESS_TOKEN in the environment.
#[test]
#[ignore]
fn fetch_airing_ranking() {
    let token = std::env::var("ACCESS_TOKEN").expect("ACCESS_TOKEN required");

    let api = MalRankingApi::default();
    let records = api
        .fetch(RankingCategory::Airing, &token)
        .expect("fetch should succeed");

    assert!(!records.is_empty(), "airing ranking should not be empty");
    assert!(records.len() <= 50, "page limit is 50");

    // a ranked view should carry ids and titles throughout
    for record in &records {
        assert!(record.id.is_some());
        assert!(record.title.is_some());
    }
}

/// Exchange the refresh token for a new access token.
/// Requires REFRESH_TOKEN and CLIENT_ID in the environment.
#[test]
#[ignore]
fn refresh_token_exchange() {
    use animeline_mal::{MalTokenEndpoint, TokenExchange};

    let refresh_token = std::env::var("REFRESH_TOKEN").expect("REFRESH_TOKEN required");
    let client_id = std::env::var("CLIENT_ID").expect("CLIENT_ID required");

    let endpoint = MalTokenEndpoint::default();
    let access_token = endpoint
        .exchange(&refresh_token, &client_id)
        .expect("refresh should succeed");

    assert!(!access_token.is_empty());
}

/// A bogus token must surface as ExpiredToken, not a generic failure.
#[test]
#[ignore]
fn bogus_token_is_expired() {
    let api = MalRankingApi::default();
    let err = api
        .fetch(RankingCategory::All, "not-a-real-token")
        .expect_err("fetch should be rejected");
    assert!(err.is_expired());
}
