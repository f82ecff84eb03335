use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RefreshError {
    #[error("Http client error: {0}")]
    Client(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Token endpoint returned {0}")]
    Status(StatusCode),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RefreshError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}
