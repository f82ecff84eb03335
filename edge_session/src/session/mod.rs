mod errors;
mod policy;
mod types;

pub use errors::CodecError;
pub use policy::{DEFAULT_REFRESH_WINDOW_SECS, RefreshDecision, SessionState, classify, evaluate};
pub use types::{CookieChunk, SessionRecord};
