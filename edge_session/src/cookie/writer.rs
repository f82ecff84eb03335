use http::HeaderMap;
use http::header::{COOKIE, HeaderValue};

use super::chunk::chunk_index;
use crate::session::CookieChunk;
use crate::utils::{CookieAttributes, UtilError, header_set_cookie};

/// Builds the `Set-Cookie` headers replacing one chunk set with another.
///
/// Every new chunk is written with `attributes`. Every name in
/// `existing_names` that the new set no longer uses is expired in the same
/// response, so the browser never keeps a stale tail.
pub fn write_session_cookies(
    chunks: &[CookieChunk],
    existing_names: &[String],
    attributes: CookieAttributes,
) -> Result<HeaderMap, UtilError> {
    let mut headers = HeaderMap::new();

    for chunk in chunks {
        header_set_cookie(&mut headers, &chunk.name, &chunk.value, attributes)?;
    }

    let expired = CookieAttributes {
        max_age: 0,
        ..attributes
    };
    for name in existing_names {
        if chunks.iter().any(|chunk| &chunk.name == name) {
            continue;
        }
        tracing::debug!("Expiring stale session chunk {}", name);
        header_set_cookie(&mut headers, name, "", expired)?;
    }

    Ok(headers)
}

/// Replaces the session chunks in the request's `Cookie` header.
///
/// Handlers that run after the gateway then read the refreshed session. All
/// cookies not belonging to `base_name` keep their original order.
pub fn rewrite_request_cookies(
    headers: &mut HeaderMap,
    base_name: &str,
    chunks: &[CookieChunk],
) -> Result<(), UtilError> {
    let mut pairs: Vec<String> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split_once('=').map_or(*pair, |(name, _)| name).trim();
            chunk_index(base_name, name).is_none()
        })
        .map(str::to_string)
        .collect();

    pairs.extend(
        chunks
            .iter()
            .map(|chunk| format!("{}={}", chunk.name, chunk.value)),
    );

    headers.remove(COOKIE);
    if !pairs.is_empty() {
        let value = HeaderValue::from_str(&pairs.join("; "))
            .map_err(|_| UtilError::Cookie("Failed to rebuild cookie header".to_string()))?;
        headers.insert(COOKIE, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::SET_COOKIE;

    fn chunk(name: &str, value: &str) -> CookieChunk {
        CookieChunk {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn set_cookies(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    const SECURE: CookieAttributes = CookieAttributes {
        secure: true,
        max_age: 34_560_000,
    };

    #[test]
    fn test_write_single_chunk_no_existing() {
        let headers = write_session_cookies(&[chunk("sb", "v")], &[], SECURE).unwrap();
        assert_eq!(
            set_cookies(&headers),
            vec!["sb=v; Path=/; SameSite=Lax; Max-Age=34560000; Secure"]
        );
    }

    /// Shrinking from three chunks to one expires both continuations.
    #[test]
    fn test_write_expires_stale_chunks_on_shrink() {
        let existing = vec!["sb".to_string(), "sb.0".to_string(), "sb.1".to_string()];
        let headers = write_session_cookies(&[chunk("sb", "v")], &existing, SECURE).unwrap();
        assert_eq!(
            set_cookies(&headers),
            vec![
                "sb=v; Path=/; SameSite=Lax; Max-Age=34560000; Secure",
                "sb.0=; Path=/; SameSite=Lax; Max-Age=0; Secure",
                "sb.1=; Path=/; SameSite=Lax; Max-Age=0; Secure",
            ]
        );
    }

    #[test]
    fn test_write_grow_expires_nothing() {
        let existing = vec!["sb".to_string()];
        let chunks = [chunk("sb", "a"), chunk("sb.0", "b")];
        let insecure = CookieAttributes {
            secure: false,
            max_age: 10,
        };
        let headers = write_session_cookies(&chunks, &existing, insecure).unwrap();
        assert_eq!(
            set_cookies(&headers),
            vec![
                "sb=a; Path=/; SameSite=Lax; Max-Age=10",
                "sb.0=b; Path=/; SameSite=Lax; Max-Age=10",
            ]
        );
    }

    /// Every name is either rewritten or expired, never both and never neither.
    #[test]
    fn test_write_name_sets_are_consistent() {
        let existing = vec!["sb.0".to_string(), "sb.3".to_string()];
        let chunks = [chunk("sb", "a"), chunk("sb.0", "b"), chunk("sb.1", "c")];
        let headers = write_session_cookies(&chunks, &existing, SECURE).unwrap();
        let names: Vec<String> = set_cookies(&headers)
            .iter()
            .map(|c| c.split('=').next().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["sb", "sb.0", "sb.1", "sb.3"]);
        assert!(set_cookies(&headers)[3].contains("Max-Age=0"));
    }

    #[test]
    fn test_rewrite_request_cookies_replaces_chunks() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sb=old; sb.0=old2; sb.1=old3; lang=en"),
        );
        rewrite_request_cookies(&mut headers, "sb", &[chunk("sb", "new")]).unwrap();
        assert_eq!(headers.get(COOKIE).unwrap().to_str().unwrap(), "theme=dark; lang=en; sb=new");
    }

    #[test]
    fn test_rewrite_request_cookies_merges_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; sb=old"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));
        rewrite_request_cookies(&mut headers, "sb", &[chunk("sb", "x"), chunk("sb.0", "y")])
            .unwrap();
        assert_eq!(headers.get_all(COOKIE).iter().count(), 1);
        assert_eq!(headers.get(COOKIE).unwrap().to_str().unwrap(), "a=1; b=2; sb=x; sb.0=y");
    }

    #[test]
    fn test_rewrite_request_cookies_without_existing_header() {
        let mut headers = HeaderMap::new();
        rewrite_request_cookies(&mut headers, "sb", &[chunk("sb", "x")]).unwrap();
        assert_eq!(headers.get(COOKIE).unwrap().to_str().unwrap(), "sb=x");
    }
}
