use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use http::{StatusCode, request::Parts};
use serde_json::Value;

use edge_session::SessionRecord;

/// Rejection returned when a handler requires a session and none was found.
#[derive(Debug)]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        tracing::debug!("Unauthorized");
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

/// Session of the current request, available as an Axum extractor
///
/// Populated by [`refresh_session`](crate::refresh_session). After a
/// successful refresh it already carries the new token material.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use edge_session_axum::EdgeSession;
///
/// async fn handler(session: EdgeSession) -> String {
///     format!("token expires at {}", session.expires_at())
/// }
///
/// let app: Router = Router::new().route("/", get(handler));
/// ```
#[derive(Clone)]
pub struct EdgeSession {
    record: SessionRecord,
    refreshed: bool,
}

impl std::fmt::Debug for EdgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeSession")
            .field("record", &self.record)
            .field("refreshed", &self.refreshed)
            .finish()
    }
}

impl EdgeSession {
    pub(crate) fn new(record: SessionRecord, refreshed: bool) -> Self {
        Self { record, refreshed }
    }

    pub fn access_token(&self) -> &str {
        &self.record.access_token
    }

    pub fn user(&self) -> Option<&Value> {
        self.record.user.as_ref()
    }

    /// Unix seconds at which the access token expires.
    pub fn expires_at(&self) -> i64 {
        self.record.expires_at
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.record.expires_at, 0)
    }

    /// Whether the token was refreshed while handling this request.
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }
}

impl<S> FromRequestParts<S> for EdgeSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<EdgeSession>()
            .cloned()
            .ok_or(SessionRejection)
    }
}

impl<S> OptionalFromRequestParts<S> for EdgeSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<EdgeSession>().cloned())
    }
}
