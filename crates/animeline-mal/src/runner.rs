//! Per-category extraction with single-refresh retry

use crate::api::{FetchError, RankingCategory, RankingSource};
use crate::auth::{AuthRefreshError, TokenManager};
use crate::model::RawAnime;

/// Records fetched for one category.
#[derive(Debug)]
pub struct CategoryPage {
    pub category: RankingCategory,
    pub records: Vec<RawAnime>,
}

/// How a category ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// Fetched on the first attempt.
    Fetched,
    /// Fetched after the run's token refresh.
    Refreshed,
    /// Gave up on this category; the run continued without it.
    Skipped { reason: String },
}

impl std::fmt::Display for CategoryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetched => write!(f, "OK"),
            Self::Refreshed => write!(f, "REFRESHED"),
            Self::Skipped { .. } => write!(f, "SKIPPED"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: RankingCategory,
    pub outcome: CategoryOutcome,
    pub records: usize,
}

/// Extraction result across all requested categories.
#[derive(Debug)]
pub struct Extraction {
    pub pages: Vec<CategoryPage>,
    pub reports: Vec<CategoryReport>,
}

impl Extraction {
    pub fn total_records(&self) -> usize {
        self.pages.iter().map(|p| p.records.len()).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, CategoryOutcome::Skipped { .. }))
            .count()
    }
}

/// Fetch every category sequentially with the shared credential.
///
/// On an expired token the credential is refreshed once per run and the
/// category retried once; a later expiry, or any other fetch failure, skips
/// that category and the loop continues. A failed refresh aborts the run
/// since nothing can authenticate after it.
pub fn extract(
    source: &dyn RankingSource,
    tokens: &mut TokenManager,
    categories: &[RankingCategory],
) -> Result<Extraction, AuthRefreshError> {
    let mut pages = Vec::new();
    let mut reports = Vec::new();
    let mut refreshed = false;

    for &category in categories {
        match source.fetch(category, &tokens.current().access_token) {
            Ok(records) => {
                log::info!("{category}: {} records", records.len());
                reports.push(CategoryReport {
                    category,
                    outcome: CategoryOutcome::Fetched,
                    records: records.len(),
                });
                pages.push(CategoryPage { category, records });
            }
            Err(FetchError::ExpiredToken) if !refreshed => {
                log::info!("{category}: access token expired, refreshing");
                tokens.refresh()?;
                refreshed = true;
                match source.fetch(category, &tokens.current().access_token) {
                    Ok(records) => {
                        log::info!("{category}: {} records after refresh", records.len());
                        reports.push(CategoryReport {
                            category,
                            outcome: CategoryOutcome::Refreshed,
                            records: records.len(),
                        });
                        pages.push(CategoryPage { category, records });
                    }
                    Err(e) => {
                        log::warn!("{category}: skipped after token refresh: {e}");
                        reports.push(CategoryReport {
                            category,
                            outcome: CategoryOutcome::Skipped {
                                reason: e.to_string(),
                            },
                            records: 0,
                        });
                    }
                }
            }
            Err(e) => {
                log::warn!("{category}: skipped: {e}");
                reports.push(CategoryReport {
                    category,
                    outcome: CategoryOutcome::Skipped {
                        reason: e.to_string(),
                    },
                    records: 0,
                });
            }
        }
    }

    Ok(Extraction { pages, reports })
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::auth::{Credential, TokenExchange};

    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Vec<RawAnime>, FetchError>>>,
        calls: RefCell<Vec<(RankingCategory, String)>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<RawAnime>, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RankingSource for ScriptedSource {
        fn fetch(
            &self,
            category: RankingCategory,
            access_token: &str,
        ) -> Result<Vec<RawAnime>, FetchError> {
            self.calls
                .borrow_mut()
                .push((category, access_token.to_string()));
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unscripted fetch call")
        }
    }

    struct CountingExchange {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl TokenExchange for CountingExchange {
        fn exchange(&self, _: &str, _: &str) -> Result<String, AuthRefreshError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(AuthRefreshError {
                    status: Some(400),
                    message: "invalid_grant".to_string(),
                })
            } else {
                Ok("token-2".to_string())
            }
        }
    }

    fn manager(fail: bool) -> (TokenManager, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let tokens = TokenManager::new(
            Credential {
                access_token: "token-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                client_id: "client-1".to_string(),
            },
            Box::new(CountingExchange {
                calls: calls.clone(),
                fail,
            }),
        );
        (tokens, calls)
    }

    fn records(n: usize) -> Vec<RawAnime> {
        (0..n)
            .map(|i| RawAnime {
                id: Some(i as i64),
                ..Default::default()
            })
            .collect()
    }

    fn http_error() -> FetchError {
        FetchError::Http {
            status: Some(500),
            message: "server error".to_string(),
        }
    }

    #[test]
    fn all_ok_no_refresh() {
        let source = ScriptedSource::new(vec![
            Ok(records(2)),
            Ok(records(3)),
            Ok(records(1)),
        ]);
        let (mut tokens, refresh_calls) = manager(false);

        let extraction =
            extract(&source, &mut tokens, &RankingCategory::RUN_SET).expect("run should succeed");

        assert_eq!(extraction.pages.len(), 3);
        assert_eq!(extraction.total_records(), 6);
        assert_eq!(extraction.skipped(), 0);
        assert!(extraction
            .reports
            .iter()
            .all(|r| r.outcome == CategoryOutcome::Fetched));
        assert_eq!(refresh_calls.get(), 0);
    }

    #[test]
    fn expired_token_refreshes_once_and_retries() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::ExpiredToken),
            Ok(records(2)),
            Ok(records(1)),
            Ok(records(1)),
        ]);
        let (mut tokens, refresh_calls) = manager(false);

        let extraction =
            extract(&source, &mut tokens, &RankingCategory::RUN_SET).expect("run should succeed");

        assert_eq!(refresh_calls.get(), 1);
        assert_eq!(extraction.reports[0].outcome, CategoryOutcome::Refreshed);
        assert_eq!(extraction.reports[0].records, 2);
        assert_eq!(extraction.pages.len(), 3);

        // retry and the remaining categories all used the refreshed token
        let calls = source.calls.borrow();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], (RankingCategory::All, "token-1".to_string()));
        for call in calls.iter().skip(1) {
            assert_eq!(call.1, "token-2");
        }
    }

    #[test]
    fn non_expiry_error_skips_category_and_continues() {
        let source = ScriptedSource::new(vec![
            Ok(records(2)),
            Err(http_error()),
            Ok(records(4)),
        ]);
        let (mut tokens, refresh_calls) = manager(false);

        let extraction =
            extract(&source, &mut tokens, &RankingCategory::RUN_SET).expect("run should succeed");

        assert_eq!(extraction.pages.len(), 2);
        assert_eq!(extraction.skipped(), 1);
        assert!(matches!(
            extraction.reports[1].outcome,
            CategoryOutcome::Skipped { .. }
        ));
        assert_eq!(extraction.reports[2].outcome, CategoryOutcome::Fetched);
        assert_eq!(refresh_calls.get(), 0);
    }

    #[test]
    fn failed_refresh_aborts_run() {
        let source = ScriptedSource::new(vec![Err(FetchError::ExpiredToken)]);
        let (mut tokens, refresh_calls) = manager(true);

        let err = extract(&source, &mut tokens, &RankingCategory::RUN_SET)
            .expect_err("run should abort");
        assert_eq!(err.status, Some(400));
        assert_eq!(refresh_calls.get(), 1);
        // no further categories were attempted
        assert_eq!(source.calls.borrow().len(), 1);
    }

    #[test]
    fn expiry_after_retry_skips_without_second_refresh() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::ExpiredToken),
            Err(FetchError::ExpiredToken),
            Ok(records(1)),
            Ok(records(1)),
        ]);
        let (mut tokens, refresh_calls) = manager(false);

        let extraction =
            extract(&source, &mut tokens, &RankingCategory::RUN_SET).expect("run should succeed");

        assert_eq!(refresh_calls.get(), 1);
        assert!(matches!(
            extraction.reports[0].outcome,
            CategoryOutcome::Skipped { .. }
        ));
        assert_eq!(extraction.pages.len(), 2);
    }

    #[test]
    fn expiry_on_later_category_after_refresh_skips() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::ExpiredToken),
            Ok(records(1)),
            Err(FetchError::ExpiredToken),
            Ok(records(1)),
        ]);
        let (mut tokens, refresh_calls) = manager(false);

        let extraction =
            extract(&source, &mut tokens, &RankingCategory::RUN_SET).expect("run should succeed");

        // the run's one refresh was spent on the first category
        assert_eq!(refresh_calls.get(), 1);
        assert_eq!(extraction.reports[0].outcome, CategoryOutcome::Refreshed);
        assert!(matches!(
            extraction.reports[1].outcome,
            CategoryOutcome::Skipped { .. }
        ));
        assert_eq!(extraction.reports[2].outcome, CategoryOutcome::Fetched);
    }

    #[test]
    fn zero_records_is_not_a_failure() {
        let source = ScriptedSource::new(vec![Ok(vec![]), Ok(vec![]), Ok(vec![])]);
        let (mut tokens, _) = manager(false);

        let extraction =
            extract(&source, &mut tokens, &RankingCategory::RUN_SET).expect("run should succeed");
        assert_eq!(extraction.total_records(), 0);
        assert_eq!(extraction.pages.len(), 3);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(CategoryOutcome::Fetched.to_string(), "OK");
        assert_eq!(CategoryOutcome::Refreshed.to_string(), "REFRESHED");
        assert_eq!(
            CategoryOutcome::Skipped {
                reason: "HTTP 500".to_string()
            }
            .to_string(),
            "SKIPPED"
        );
    }
}
