use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::errors::RefreshError;
use super::types::TokenResponse;

/// Header carrying the client-level API key.
pub const API_KEY_HEADER: &str = "apikey";

/// Exchanges a refresh token for new token material.
///
/// Implementations make exactly one attempt per call. Retrying is left to the
/// next request.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError>;
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Token endpoint reached over HTTP with a refresh grant.
#[derive(Clone)]
pub struct HttpTokenEndpoint {
    client: reqwest::Client,
    token_url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpTokenEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTokenEndpoint")
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl HttpTokenEndpoint {
    pub fn new(token_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, RefreshError> {
        Ok(Self {
            client: get_client()?,
            token_url: token_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

/// HTTP client shared by every refresh call.
///
/// - `timeout`: 30 seconds. This is the only bound on a hung token endpoint;
///   the surrounding server owns any tighter request deadline.
/// - `pool_idle_timeout`: 90 seconds.
/// - `pool_max_idle_per_host`: 32.
fn get_client() -> Result<reqwest::Client, RefreshError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| RefreshError::Client(e.to_string()))
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    #[tracing::instrument(skip_all, fields(token_url = %self.token_url))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        let response = self
            .client
            .post(&self.token_url)
            .query(&[("grant_type", "refresh_token")])
            .header(API_KEY_HEADER, &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&RefreshGrant { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Token endpoint responded with status {}", status);
            return Err(RefreshError::Status(status));
        }

        let body = response.text().await?;
        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            RefreshError::InvalidResponse(format!(
                "{:?} error at line {} column {}",
                e.classify(),
                e.line(),
                e.column()
            ))
        })?;

        if token_response.expires_in <= 0 {
            return Err(RefreshError::InvalidResponse(format!(
                "non-positive expires_in {}",
                token_response.expires_in
            )));
        }

        Ok(token_response)
    }
}
