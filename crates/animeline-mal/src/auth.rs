//! MAL OAuth2 credential handling
//!
//! One credential is active per run. A refresh exchanges the externally
//! supplied refresh token for a new access token and replaces the held
//! credential wholesale; nothing here persists tokens across runs.

use animeline_core::{SHARED_RUNTIME, http_client};
use serde::Deserialize;

/// Production token refresh endpoint.
pub const TOKEN_URL: &str = "https://myanimelist.net/v1/oauth2/token";

/// Bearer credential for the ranking API.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub client_id: String,
}

/// Token refresh was rejected or unreachable. Fatal for the run: no
/// category can authenticate after this.
#[derive(Debug)]
pub struct AuthRefreshError {
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for AuthRefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(s) => write!(f, "token refresh failed (HTTP {s}): {}", self.message),
            None => write!(f, "token refresh failed: {}", self.message),
        }
    }
}

impl std::error::Error for AuthRefreshError {}

impl AuthRefreshError {
    fn from_reqwest(e: &reqwest::Error) -> Self {
        let (status, message) = animeline_core::error_parts(e);
        Self { status, message }
    }
}

/// Exchanges a refresh token for a new access token. Implemented by the
/// real endpoint; stubbed in runner tests.
pub trait TokenExchange {
    fn exchange(&self, refresh_token: &str, client_id: &str) -> Result<String, AuthRefreshError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The MAL OAuth2 token endpoint.
pub struct MalTokenEndpoint {
    token_url: String,
}

impl MalTokenEndpoint {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
        }
    }
}

impl Default for MalTokenEndpoint {
    fn default() -> Self {
        Self::new(TOKEN_URL)
    }
}

impl TokenExchange for MalTokenEndpoint {
    fn exchange(&self, refresh_token: &str, client_id: &str) -> Result<String, AuthRefreshError> {
        SHARED_RUNTIME.handle().block_on(async {
            let params = [
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
            ];
            let resp = http_client()
                .post(&self.token_url)
                .form(&params)
                .send()
                .await
                .map_err(|e| AuthRefreshError::from_reqwest(&e))?;

            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(AuthRefreshError {
                    status: Some(status.as_u16()),
                    message: animeline_core::snippet(&body),
                });
            }

            let parsed: TokenResponse =
                serde_json::from_str(&body).map_err(|e| AuthRefreshError {
                    status: None,
                    message: format!("invalid token response: {e}"),
                })?;
            Ok(parsed.access_token)
        })
    }
}

/// Holds the run's single credential and refreshes it on demand.
pub struct TokenManager {
    credential: Credential,
    endpoint: Box<dyn TokenExchange>,
}

impl TokenManager {
    pub fn new(credential: Credential, endpoint: Box<dyn TokenExchange>) -> Self {
        Self {
            credential,
            endpoint,
        }
    }

    /// The active credential.
    pub fn current(&self) -> &Credential {
        &self.credential
    }

    /// Exchange the refresh token for a new access token, replacing the held
    /// credential wholesale, and return the new state.
    pub fn refresh(&mut self) -> Result<&Credential, AuthRefreshError> {
        let access_token = self
            .endpoint
            .exchange(&self.credential.refresh_token, &self.credential.client_id)?;
        self.credential = Credential {
            access_token,
            ..self.credential.clone()
        };
        log::info!("Access token refreshed");
        Ok(&self.credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExchange {
        result: Result<&'static str, (Option<u16>, &'static str)>,
    }

    impl TokenExchange for FixedExchange {
        fn exchange(&self, _: &str, _: &str) -> Result<String, AuthRefreshError> {
            match self.result {
                Ok(token) => Ok(token.to_string()),
                Err((status, message)) => Err(AuthRefreshError {
                    status,
                    message: message.to_string(),
                }),
            }
        }
    }

    fn credential() -> Credential {
        Credential {
            access_token: "token-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            client_id: "client-1".to_string(),
        }
    }

    #[test]
    fn refresh_replaces_access_token_only() {
        let mut tokens = TokenManager::new(
            credential(),
            Box::new(FixedExchange {
                result: Ok("token-2"),
            }),
        );
        let updated = tokens.refresh().expect("refresh should succeed");
        assert_eq!(updated.access_token, "token-2");
        assert_eq!(updated.refresh_token, "refresh-1");
        assert_eq!(updated.client_id, "client-1");
        assert_eq!(tokens.current().access_token, "token-2");
    }

    #[test]
    fn failed_refresh_keeps_old_credential() {
        let mut tokens = TokenManager::new(
            credential(),
            Box::new(FixedExchange {
                result: Err((Some(400), "invalid_grant")),
            }),
        );
        let err = tokens.refresh().expect_err("refresh should fail");
        assert_eq!(err.status, Some(400));
        assert_eq!(tokens.current().access_token, "token-1");
    }

    #[test]
    fn refresh_error_display() {
        let err = AuthRefreshError {
            status: Some(401),
            message: "expired".to_string(),
        };
        assert_eq!(format!("{err}"), "token refresh failed (HTTP 401): expired");

        let err = AuthRefreshError {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(format!("{err}"), "token refresh failed: connection refused");
    }

    #[test]
    fn token_response_parses() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"token_type":"Bearer","access_token":"abc","refresh_token":"def","expires_in":2678400}"#)
                .unwrap();
        assert_eq!(parsed.access_token, "abc");
    }
}
