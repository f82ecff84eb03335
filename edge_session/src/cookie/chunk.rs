use crate::session::CookieChunk;

/// Default upper bound for a single chunk value, in bytes.
///
/// Browsers cap a cookie at 4096 bytes including its name and attributes,
/// this leaves room for both.
pub const DEFAULT_CHUNK_SIZE: usize = 3180;

/// Name of the cookie holding chunk `index` of a session.
///
/// The first chunk always uses the base name; later chunks are numbered
/// continuations starting at `.0`.
pub fn chunk_name(base_name: &str, index: usize) -> String {
    match index {
        0 => base_name.to_string(),
        n => format!("{base_name}.{}", n - 1),
    }
}

/// Inverse of [`chunk_name`]: the chunk index a cookie name stands for.
pub fn chunk_index(base_name: &str, cookie_name: &str) -> Option<usize> {
    let suffix = cookie_name.strip_prefix(base_name)?;
    if suffix.is_empty() {
        return Some(0);
    }
    let digits = suffix.strip_prefix('.')?;
    // Reject "+1", "01" and friends so that one index maps to one name.
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse::<usize>().ok()?.checked_add(1)
}

/// Walks a string one indivisible text unit at a time: a `%XX` escape or a
/// single UTF-8 scalar. Yields the byte range of each unit.
struct TextUnits<'a> {
    value: &'a str,
    pos: usize,
}

impl Iterator for TextUnits<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.value[self.pos..];
        let ch = rest.chars().next()?;
        let bytes = rest.as_bytes();
        let len = match ch {
            '%' if bytes.len() >= 3
                && bytes[1].is_ascii_hexdigit()
                && bytes[2].is_ascii_hexdigit() =>
            {
                3
            }
            _ => ch.len_utf8(),
        };
        let start = self.pos;
        self.pos += len;
        Some((start, self.pos))
    }
}

/// Splits `value` into contiguous pieces of at most `max_bytes` bytes.
///
/// Split points only fall between text units, so neither an escape nor a
/// multi-byte character is ever divided. A unit longer than `max_bytes` is
/// emitted alone. A value that fits yields exactly one piece.
pub fn split_value(value: &str, max_bytes: usize) -> Vec<&str> {
    let max_bytes = max_bytes.max(1);
    if value.len() <= max_bytes {
        return vec![value];
    }

    let mut pieces = Vec::with_capacity(value.len() / max_bytes + 1);
    let mut start = 0;
    let mut end = 0;
    for (_, unit_end) in (TextUnits { value, pos: 0 }) {
        if unit_end - start > max_bytes && end > start {
            pieces.push(&value[start..end]);
            start = end;
        }
        end = unit_end;
    }
    pieces.push(&value[start..end]);
    pieces
}

/// Splits an encoded session into named chunks.
pub fn chunk_value(base_name: &str, encoded: &str, max_bytes: usize) -> Vec<CookieChunk> {
    split_value(encoded, max_bytes)
        .into_iter()
        .enumerate()
        .map(|(index, value)| CookieChunk {
            name: chunk_name(base_name, index),
            value: value.to_string(),
        })
        .collect()
}
