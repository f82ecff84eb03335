use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Session payload carried across requests inside the session cookies.
///
/// Four fields are managed by the gateway. Everything else the provider put
/// into the payload lands in `extra` and is written back untouched, in the
/// order it was read.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds at which `access_token` stops being valid.
    pub expires_at: i64,
    /// `None` only when the key is absent; an explicit `null` is kept as
    /// `Some(Value::Null)` so it is written back unchanged.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionRecord {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
            user: None,
            extra: Map::new(),
        }
    }

    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    /// Seconds left before `access_token` expires; negative once expired.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// Tokens and user claims must never reach a log line.
impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user.as_ref().map(|_| "[redacted]"))
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One cookie of an ordered chunk set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieChunk {
    pub name: String,
    pub value: String,
}
