//! Central configuration for the edge_session crate

use std::env;
use std::sync::LazyLock;

use thiserror::Error;
use url::Url;

use crate::cookie::DEFAULT_CHUNK_SIZE;
use crate::session::DEFAULT_REFRESH_WINDOW_SECS;

/// Default Max-Age of written session chunks: 400 days, the longest
/// lifetime browsers honour.
pub const DEFAULT_COOKIE_MAX_AGE: i64 = 400 * 24 * 60 * 60;

/// Path of the token endpoint below the provider base URL.
pub const TOKEN_ENDPOINT_PATH: &str = "/auth/v1/token";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Provider base URL; the token URL and cookie name derive from it.
pub static EDGE_AUTH_URL: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("EDGE_AUTH_URL").ok());

pub static EDGE_TOKEN_URL: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("EDGE_TOKEN_URL").ok());

pub(crate) static EDGE_API_KEY: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("EDGE_API_KEY").ok());

pub static SESSION_COOKIE_NAME: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("SESSION_COOKIE_NAME").ok());

pub static SESSION_CHUNK_SIZE: LazyLock<usize> = LazyLock::new(|| {
    parse_or(env::var("SESSION_CHUNK_SIZE").ok().as_deref(), DEFAULT_CHUNK_SIZE)
});

pub static SESSION_COOKIE_MAX_AGE: LazyLock<i64> = LazyLock::new(|| {
    parse_or(
        env::var("SESSION_COOKIE_MAX_AGE").ok().as_deref(),
        DEFAULT_COOKIE_MAX_AGE,
    )
});

pub static SESSION_REFRESH_WINDOW: LazyLock<i64> = LazyLock::new(|| {
    parse_or(
        env::var("SESSION_REFRESH_WINDOW").ok().as_deref(),
        DEFAULT_REFRESH_WINDOW_SECS,
    )
});

// Unset or unparsable values fall back to the default.
fn parse_or<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

/// Settings for one gateway instance.
#[derive(Clone, PartialEq)]
pub struct GatewayConfig {
    pub cookie_name: String,
    pub chunk_size: usize,
    pub cookie_max_age: i64,
    pub refresh_window: i64,
    pub token_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("cookie_name", &self.cookie_name)
            .field("chunk_size", &self.chunk_size)
            .field("cookie_max_age", &self.cookie_max_age)
            .field("refresh_window", &self.refresh_window)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl GatewayConfig {
    /// Configuration with the default chunk size, max-age and window.
    pub fn new(
        cookie_name: impl Into<String>,
        token_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            cookie_max_age: DEFAULT_COOKIE_MAX_AGE,
            refresh_window: DEFAULT_REFRESH_WINDOW_SECS,
            token_url: token_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_cookie_max_age(mut self, cookie_max_age: i64) -> Self {
        self.cookie_max_age = cookie_max_age;
        self
    }

    pub fn with_refresh_window(mut self, refresh_window: i64) -> Self {
        self.refresh_window = refresh_window;
        self
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(
            EDGE_AUTH_URL.as_deref(),
            EDGE_TOKEN_URL.as_deref(),
            EDGE_API_KEY.as_deref(),
            SESSION_COOKIE_NAME.as_deref(),
        )
        .map(|config| {
            config
                .with_chunk_size(*SESSION_CHUNK_SIZE)
                .with_cookie_max_age(*SESSION_COOKIE_MAX_AGE)
                .with_refresh_window(*SESSION_REFRESH_WINDOW)
        })
        .and_then(Self::validate)
    }

    fn from_parts(
        auth_url: Option<&str>,
        token_url: Option<&str>,
        api_key: Option<&str>,
        cookie_name: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing("EDGE_API_KEY".to_string()))?;

        let token_url = match (token_url, auth_url) {
            (Some(token_url), _) => token_url.to_string(),
            (None, Some(auth_url)) => {
                format!("{}{TOKEN_ENDPOINT_PATH}", auth_url.trim_end_matches('/'))
            }
            (None, None) => {
                return Err(ConfigError::Missing(
                    "EDGE_AUTH_URL or EDGE_TOKEN_URL".to_string(),
                ));
            }
        };

        let cookie_name = match (cookie_name, auth_url) {
            (Some(name), _) => name.to_string(),
            (None, Some(auth_url)) => derive_cookie_name(auth_url)?,
            (None, None) => {
                return Err(ConfigError::Missing(
                    "SESSION_COOKIE_NAME or EDGE_AUTH_URL".to_string(),
                ));
            }
        };

        Ok(Self::new(cookie_name, token_url, api_key))
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
        {
            return Err(ConfigError::Invalid(format!(
                "cookie name {:?} is not a valid cookie token",
                self.cookie_name
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk size must be at least 1".into()));
        }
        if self.refresh_window < 0 {
            return Err(ConfigError::Invalid(
                "refresh window must not be negative".into(),
            ));
        }
        if self.cookie_max_age <= 0 {
            return Err(ConfigError::Invalid("cookie max-age must be positive".into()));
        }
        Url::parse(&self.token_url)
            .map_err(|e| ConfigError::Invalid(format!("token url: {e}")))?;
        Ok(self)
    }
}

/// Cookie name derived from the provider URL: `sb-<first host label>-auth-token`.
pub fn derive_cookie_name(auth_url: &str) -> Result<String, ConfigError> {
    let url = Url::parse(auth_url).map_err(|e| ConfigError::Invalid(format!("auth url: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::Invalid("auth url has no host".to_string()))?;
    let project_ref = host.split('.').next().unwrap_or(host);
    Ok(format!("sb-{project_ref}-auth-token"))
}
