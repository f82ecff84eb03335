use serde_json::error::Category;

use crate::session::{CodecError, SessionRecord};
use crate::utils::{base64url_decode, base64url_encode};

/// Prefix of every value written by this codec version.
pub const CODEC_VERSION_PREFIX: &str = "base64-";

/// Serializes a session to `base64-<base64url(json)>`.
///
/// The transform runs over the UTF-8 bytes of the JSON text, so the output
/// is plain ASCII and a multi-byte character can never be cut in half.
pub fn encode_session(session: &SessionRecord) -> Result<String, CodecError> {
    let json = serde_json::to_vec(session).map_err(json_error)?;
    Ok(format!("{CODEC_VERSION_PREFIX}{}", base64url_encode(&json)))
}

/// Parses a reassembled cookie value back into a session.
///
/// Values without the version prefix are older cookies holding the JSON
/// directly, either raw or percent-encoded.
pub fn decode_session(value: &str) -> Result<SessionRecord, CodecError> {
    if value.is_empty() {
        return Err(CodecError::Empty);
    }

    if let Some(encoded) = value.strip_prefix(CODEC_VERSION_PREFIX) {
        let bytes = base64url_decode(encoded.trim_end_matches('='))
            .map_err(|e| CodecError::Base64(e.to_string()))?;
        return serde_json::from_slice(&bytes).map_err(json_error);
    }

    decode_legacy(value)
}

fn decode_legacy(value: &str) -> Result<SessionRecord, CodecError> {
    match serde_json::from_str(value) {
        Ok(session) => Ok(session),
        Err(raw_err) if value.contains('%') => {
            let decoded = urlencoding::decode(value)
                .map_err(|_| CodecError::Json("legacy value is not valid percent-encoding".into()))?;
            serde_json::from_str(&decoded).map_err(|e| {
                tracing::debug!("Legacy session decode failed: {}", json_error(raw_err));
                json_error(e)
            })
        }
        Err(e) => Err(json_error(e)),
    }
}

// serde_json messages may quote the offending input, so only the category
// and position are kept.
fn json_error(e: serde_json::Error) -> CodecError {
    match e.classify() {
        Category::Data => CodecError::InvalidField(format!(
            "session schema mismatch at line {} column {}",
            e.line(),
            e.column()
        )),
        category => CodecError::Json(format!(
            "{category:?} error at line {} column {}",
            e.line(),
            e.column()
        )),
    }
}
