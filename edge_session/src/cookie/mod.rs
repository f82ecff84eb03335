mod chunk;
mod codec;
mod reader;
mod writer;

pub use chunk::{DEFAULT_CHUNK_SIZE, chunk_index, chunk_name, chunk_value, split_value};
pub use codec::{CODEC_VERSION_PREFIX, decode_session, encode_session};
pub use reader::{SessionCookies, read_session_cookies};
pub use writer::{rewrite_request_cookies, write_session_cookies};
