use std::sync::Arc;

use chrono::Utc;
use http::HeaderMap;

use crate::config::GatewayConfig;
use crate::cookie::{
    SessionCookies, chunk_value, decode_session, encode_session, read_session_cookies,
    write_session_cookies,
};
use crate::refresh::{RefreshError, TokenEndpoint};
use crate::session::{CodecError, CookieChunk, SessionRecord, SessionState, classify};
use crate::utils::{CookieAttributes, UtilError};

#[derive(Debug, thiserror::Error)]
enum WriteError {
    #[error("Failed to encode session: {0}")]
    Codec(#[from] CodecError),
    #[error("Failed to build cookies: {0}")]
    Cookie(#[from] UtilError),
}

/// Result of running the gateway for one request.
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    /// No chunks, or chunks that did not decode.
    NoSession,
    /// Session has enough validity left; nothing is written.
    Valid(SessionRecord),
    /// Session was refreshed and the response must carry the new cookies.
    Refreshed(RefreshedSession),
    /// Refresh was attempted and failed; the old cookies stay as they are.
    RefreshFailed(SessionRecord),
}

#[derive(Clone)]
pub struct RefreshedSession {
    pub session: SessionRecord,
    pub chunks: Vec<CookieChunk>,
    pub set_cookie: HeaderMap,
}

// Chunk values are the encoded tokens; only names are printed.
impl std::fmt::Debug for RefreshedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshedSession")
            .field("session", &self.session)
            .field(
                "chunks",
                &self.chunks.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            )
            .field("set_cookie_count", &self.set_cookie.len())
            .finish()
    }
}

impl GatewayOutcome {
    /// `Set-Cookie` headers to add to the response; only a refresh writes any.
    pub fn set_cookie_headers(&self) -> Option<&HeaderMap> {
        match self {
            GatewayOutcome::Refreshed(refreshed) => Some(&refreshed.set_cookie),
            _ => None,
        }
    }

    /// Session visible to downstream handlers for this request.
    pub fn session(&self) -> Option<&SessionRecord> {
        match self {
            GatewayOutcome::NoSession => None,
            GatewayOutcome::Valid(session) | GatewayOutcome::RefreshFailed(session) => {
                Some(session)
            }
            GatewayOutcome::Refreshed(refreshed) => Some(&refreshed.session),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.set_cookie_headers().is_none()
    }
}

/// Request-scoped session refresher.
///
/// Holds no per-session state: every call derives everything from the
/// request cookies, the clock value it is given and the token endpoint.
#[derive(Clone)]
pub struct SessionGateway {
    config: GatewayConfig,
    endpoint: Arc<dyn TokenEndpoint>,
}

impl std::fmt::Debug for SessionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionGateway {
    pub fn new(config: GatewayConfig, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self { config, endpoint }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Runs the gateway against the current wall clock.
    pub async fn process_now(&self, request_headers: &HeaderMap, secure: bool) -> GatewayOutcome {
        self.process(request_headers, secure, Utc::now().timestamp())
            .await
    }

    /// Reads, evaluates and, when needed, refreshes the request's session.
    ///
    /// Never fails: every error degrades to a pass-through outcome.
    #[tracing::instrument(skip_all, fields(cookie = %self.config.cookie_name, secure = secure))]
    pub async fn process(
        &self,
        request_headers: &HeaderMap,
        secure: bool,
        now: i64,
    ) -> GatewayOutcome {
        let Some(cookies) = read_session_cookies(request_headers, &self.config.cookie_name) else {
            return GatewayOutcome::NoSession;
        };

        let session = match decode_session(&cookies.encoded) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("Ignoring undecodable session cookies: {}", e);
                None
            }
        };

        match classify(session, now, self.config.refresh_window) {
            SessionState::NoSession => GatewayOutcome::NoSession,
            SessionState::Valid(session) => {
                tracing::debug!(
                    "Session valid for {}s, no refresh needed",
                    session.remaining_secs(now)
                );
                GatewayOutcome::Valid(session)
            }
            SessionState::ExpiringSoon(session) => {
                tracing::debug!(
                    "Session expires in {}s, refreshing",
                    session.remaining_secs(now)
                );
                self.refresh(session, cookies, secure, now).await
            }
        }
    }

    async fn refresh(
        &self,
        session: SessionRecord,
        cookies: SessionCookies,
        secure: bool,
        now: i64,
    ) -> GatewayOutcome {
        let token_response = match self.endpoint.refresh(&session.refresh_token).await {
            Ok(token_response) => token_response,
            Err(e) => {
                log_refresh_failure(&e);
                return GatewayOutcome::RefreshFailed(session);
            }
        };

        let refreshed = token_response.into_session(session.clone(), now);
        match self.build_cookies(&refreshed, &cookies.existing_names, secure) {
            Ok((chunks, set_cookie)) => {
                tracing::debug!(
                    "Session refreshed, writing {} chunk(s), expiring {}",
                    chunks.len(),
                    set_cookie.len() - chunks.len()
                );
                GatewayOutcome::Refreshed(RefreshedSession {
                    session: refreshed,
                    chunks,
                    set_cookie,
                })
            }
            Err(e) => {
                tracing::error!("Failed to write refreshed session cookies: {}", e);
                GatewayOutcome::RefreshFailed(session)
            }
        }
    }

    fn build_cookies(
        &self,
        session: &SessionRecord,
        existing_names: &[String],
        secure: bool,
    ) -> Result<(Vec<CookieChunk>, HeaderMap), WriteError> {
        let encoded = encode_session(session)?;
        let chunks = chunk_value(&self.config.cookie_name, &encoded, self.config.chunk_size);
        let attributes = CookieAttributes {
            secure,
            max_age: self.config.cookie_max_age,
        };
        let set_cookie = write_session_cookies(&chunks, existing_names, attributes)?;
        Ok((chunks, set_cookie))
    }
}

fn log_refresh_failure(err: &RefreshError) {
    match err {
        RefreshError::Status(status) if status.is_client_error() => {
            tracing::info!("Session refresh rejected by token endpoint: {}", err)
        }
        _ => tracing::warn!("Session refresh failed: {}", err),
    }
}
