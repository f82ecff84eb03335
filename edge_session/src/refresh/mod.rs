mod client;
mod errors;
mod types;

pub use client::{API_KEY_HEADER, HttpTokenEndpoint, TokenEndpoint};
pub use errors::RefreshError;
pub use types::TokenResponse;
