//! edge-session - Cookie-carried session refresh for edge request filters
//!
//! Reads a chunked session cookie set, refreshes the access token shortly
//! before it expires and hands back the `Set-Cookie` headers that replace the
//! old chunk set, including expiry of chunks the new session no longer needs.

mod config;
mod cookie;
mod gateway;
mod refresh;
mod session;
mod utils;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use config::{
    ConfigError, DEFAULT_COOKIE_MAX_AGE, GatewayConfig, TOKEN_ENDPOINT_PATH, derive_cookie_name,
};

pub use cookie::{
    CODEC_VERSION_PREFIX, DEFAULT_CHUNK_SIZE, SessionCookies, chunk_index, chunk_name,
    chunk_value, decode_session, encode_session, read_session_cookies, rewrite_request_cookies,
    split_value, write_session_cookies,
};

pub use gateway::{GatewayOutcome, RefreshedSession, SessionGateway};

pub use refresh::{API_KEY_HEADER, HttpTokenEndpoint, RefreshError, TokenEndpoint, TokenResponse};

pub use session::{
    CodecError, CookieChunk, DEFAULT_REFRESH_WINDOW_SECS, RefreshDecision, SessionRecord,
    SessionState, classify, evaluate,
};

pub use utils::{CookieAttributes, UtilError, request_is_secure};

/// Builds a gateway from the environment, talking to the configured token endpoint.
pub fn init() -> Result<SessionGateway, Box<dyn std::error::Error + Send + Sync>> {
    let config = GatewayConfig::from_env()?;
    let endpoint = HttpTokenEndpoint::new(config.token_url.clone(), config.api_key.clone())?;
    tracing::info!(
        cookie = %config.cookie_name,
        token_url = %config.token_url,
        "Session gateway initialized"
    );
    Ok(SessionGateway::new(config, Arc::new(endpoint)))
}
