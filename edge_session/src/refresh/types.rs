use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::session::SessionRecord;

// Keys the gateway owns; a provider echoing them must not shadow the real fields.
const MANAGED_FIELDS: [&str; 4] = ["access_token", "refresh_token", "expires_at", "user"];

/// Successful answer of the token endpoint to a refresh grant.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Some providers keep the refresh token unchanged and omit it here.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_in", &self.expires_in)
            .field("user", &self.user.as_ref().map(|_| "[redacted]"))
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TokenResponse {
    /// Folds the new token material into the previous session.
    ///
    /// `expires_at` is set to `now + expires_in` here and nowhere else.
    /// Fields the response does not carry keep their previous values.
    pub fn into_session(self, previous: SessionRecord, now: i64) -> SessionRecord {
        let mut session = previous;
        session.access_token = self.access_token;
        if let Some(refresh_token) = self.refresh_token {
            session.refresh_token = refresh_token;
        }
        session.expires_at = now.saturating_add(self.expires_in);
        if let Some(user) = self.user {
            session.user = Some(user);
        }
        if session.extra.contains_key("expires_in") {
            session
                .extra
                .insert("expires_in".to_string(), Value::from(self.expires_in));
        }
        for (key, value) in self.extra {
            if !MANAGED_FIELDS.contains(&key.as_str()) {
                session.extra.insert(key, value);
            }
        }
        session
    }
}
