use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::Uri;
use http::header::{HeaderMap, SET_COOKIE};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Attributes shared by every session chunk written in one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieAttributes {
    pub secure: bool,
    pub max_age: i64,
}

/// Appends one `Set-Cookie` header.
///
/// Session chunks stay readable from scripts (no `HttpOnly`) because the
/// browser-side client decodes the same cookies.
pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    attributes: CookieAttributes,
) -> Result<(), UtilError> {
    let mut cookie = format!(
        "{name}={value}; Path=/; SameSite=Lax; Max-Age={}",
        attributes.max_age
    );
    if attributes.secure {
        cookie.push_str("; Secure");
    }
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to build cookie {name}")))?,
    );
    Ok(())
}

/// Decides whether the inbound request arrived over TLS.
///
/// Proxy headers win over the request URI so that a TLS-terminating proxy in
/// front of the service still yields `Secure` cookies.
pub fn request_is_secure(headers: &HeaderMap, uri: &Uri) -> bool {
    if let Some(proto) = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        return proto.trim().eq_ignore_ascii_case("https");
    }

    if let Some(proto) = headers
        .get(http::header::FORWARDED)
        .and_then(|v| v.to_str().ok())
        .and_then(forwarded_proto)
    {
        return proto.eq_ignore_ascii_case("https");
    }

    uri.scheme_str()
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https"))
}

// First hop only: `Forwarded: for=1.2.3.4;proto=https, for=5.6.7.8`
fn forwarded_proto(value: &str) -> Option<&str> {
    value.split(',').next()?.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("proto")
            .then(|| val.trim().trim_matches('"'))
    })
}
