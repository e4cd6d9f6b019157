//! Shared HTTP client and runtime.
//!
//! Uses async reqwest internally but presents sync call sites via
//! SHARED_RUNTIME.block_on. Every call is a single bounded request/response:
//! a connect timeout plus a whole-request timeout, no long-poll or streaming.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-request timeout (connect through response body)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on response bodies quoted inside error messages
const SNIPPET_LEN: usize = 200;

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Status code and message from a reqwest error, for typed error mapping.
/// A timeout carries no status and maps the same as any transport failure.
pub fn error_parts(e: &reqwest::Error) -> (Option<u16>, String) {
    (e.status().map(|s| s.as_u16()), e.to_string())
}

/// Truncate a response body for inclusion in an error message.
pub fn snippet(body: &str) -> String {
    if body.len() <= SNIPPET_LEN {
        return body.trim_end().to_string();
    }
    let mut end = SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_short_body_unchanged() {
        assert_eq!(snippet("not found"), "not found");
    }

    #[test]
    fn snippet_trims_trailing_whitespace() {
        assert_eq!(snippet("error\n"), "error");
    }

    #[test]
    fn snippet_long_body_truncated() {
        let body = "x".repeat(500);
        let s = snippet(&body);
        assert!(s.ends_with("..."));
        assert!(s.len() <= SNIPPET_LEN + 3);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let body = "é".repeat(300);
        let s = snippet(&body);
        assert!(s.ends_with("..."));
    }
}
