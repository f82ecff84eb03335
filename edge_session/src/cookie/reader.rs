use std::collections::BTreeMap;

use headers::{Cookie, HeaderMapExt};
use http::HeaderMap;

use super::chunk::{chunk_index, chunk_name};

/// Session cookies found on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookies {
    /// Concatenation of the contiguous chunk run starting at the base name.
    pub encoded: String,
    /// Every chunk name present on the request, contiguous or not.
    pub existing_names: Vec<String>,
    /// `true` when chunks beyond the contiguous run were ignored.
    pub has_gap: bool,
}

/// Collects the session chunks for `base_name` from the `Cookie` header.
///
/// Returns `None` when the request carries no chunk at all. Reassembly stops
/// at the first missing index, but stale chunks past the gap are still
/// reported in `existing_names` so that they can be expired.
pub fn read_session_cookies(headers: &HeaderMap, base_name: &str) -> Option<SessionCookies> {
    let Some(cookie) = headers.typed_get::<Cookie>() else {
        tracing::debug!("No cookie header found");
        return None;
    };

    // First occurrence wins when the browser sends duplicate names.
    let mut chunks: BTreeMap<usize, &str> = BTreeMap::new();
    for (name, value) in cookie.iter() {
        if let Some(index) = chunk_index(base_name, name) {
            chunks.entry(index).or_insert(value);
        }
    }

    if chunks.is_empty() {
        tracing::debug!("No session cookie '{}' found in cookies", base_name);
        return None;
    }

    let mut encoded = String::new();
    let mut next = 0;
    while let Some(value) = chunks.get(&next) {
        encoded.push_str(value);
        next += 1;
    }

    let has_gap = next < chunks.len();
    if has_gap {
        tracing::warn!(
            cookie = base_name,
            contiguous = next,
            present = chunks.len(),
            "Session cookie reassembly stopped at a missing chunk"
        );
    }

    Some(SessionCookies {
        encoded,
        existing_names: chunks
            .keys()
            .map(|index| chunk_name(base_name, *index))
            .collect(),
        has_gap,
    })
}
