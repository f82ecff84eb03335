//! Fixtures shared by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use serde_json::{Value, json};

use crate::config::GatewayConfig;
use crate::cookie::{chunk_value, encode_session};
use crate::refresh::{RefreshError, TokenEndpoint, TokenResponse};
use crate::session::SessionRecord;

pub(crate) fn test_config() -> GatewayConfig {
    GatewayConfig::new(
        "sb-test-auth-token",
        "https://auth.test/auth/v1/token",
        "anon-key",
    )
}

pub(crate) fn sample_session(expires_at: i64) -> SessionRecord {
    let mut session = SessionRecord::new("access-token-1", "refresh-token-1", expires_at)
        .with_user(json!({"id": "u1", "email": "user@example.com"}));
    session
        .extra
        .insert("token_type".to_string(), json!("bearer"));
    session
}

/// Session whose `user` claims hold roughly `bytes` bytes of multibyte text.
pub(crate) fn session_with_large_user(bytes: usize) -> SessionRecord {
    let name: String = "ユーザー名é".chars().cycle().take(bytes / 3).collect();
    SessionRecord::new("access-token-1", "refresh-token-1", 1_700_000_000)
        .with_user(json!({"id": "u1", "display_name": name}))
}

/// `Cookie` header carrying `session` the way the gateway writes it.
pub(crate) fn cookie_header_for(config: &GatewayConfig, session: &SessionRecord) -> HeaderMap {
    let encoded = encode_session(session).unwrap();
    let cookie = chunk_value(&config.cookie_name, &encoded, config.chunk_size)
        .iter()
        .map(|chunk| format!("{}={}", chunk.name, chunk.value))
        .collect::<Vec<_>>()
        .join("; ");
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
    headers
}

/// Splits each `Set-Cookie` into `(name, value, attributes)`.
pub(crate) fn set_cookie_values(headers: &HeaderMap) -> Vec<(String, String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|header| {
            let header = header.to_str().unwrap();
            let (pair, attributes) = header.split_once(';').unwrap_or((header, ""));
            let (name, value) = pair.split_once('=').unwrap();
            (
                name.to_string(),
                value.to_string(),
                attributes.trim().to_string(),
            )
        })
        .collect()
}

/// Token endpoint answering every call with the same token material.
pub(crate) struct RecordingEndpoint {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: Option<Value>,
    calls: Mutex<Vec<String>>,
}

impl RecordingEndpoint {
    pub(crate) fn success(access_token: &str, refresh_token: &str, expires_in: i64) -> Self {
        Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_in,
            user: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn last_refresh_token(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TokenEndpoint for RecordingEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        self.calls.lock().unwrap().push(refresh_token.to_string());
        let mut body = json!({
            "access_token": self.access_token,
            "refresh_token": self.refresh_token,
            "expires_in": self.expires_in,
            "token_type": "bearer",
        });
        if let Some(user) = &self.user {
            body["user"] = user.clone();
        }
        Ok(serde_json::from_value(body).unwrap())
    }
}

/// Token endpoint failing every call with a fixed error.
pub(crate) struct FailingEndpoint(pub(crate) RefreshError);

#[async_trait]
impl TokenEndpoint for FailingEndpoint {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        Err(self.0.clone())
    }
}
