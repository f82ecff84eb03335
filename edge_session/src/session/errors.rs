use thiserror::Error;

/// Reasons a cookie value could not be turned back into a session.
///
/// Messages describe the failure only; they never quote the payload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("Empty session value")]
    Empty,

    #[error("Base64 error: {0}")]
    Base64(String),

    #[error("Json error: {0}")]
    Json(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
