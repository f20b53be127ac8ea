//! Splitting long text into transport-sized messages.
//!
//! Lengths are counted in Unicode scalar values, which is how the chat
//! transport measures its limit.

/// Longest message the chat transport accepts.
pub const TRANSPORT_LIMIT: usize = 4096;

/// Default segment length, below [`TRANSPORT_LIMIT`].
pub const DEFAULT_CHUNK_LIMIT: usize = 4000;

/// Split `text` into segments of at most `limit` characters.
///
/// A segment ends at the last newline within the first `limit + 1`
/// characters, and that newline is dropped; text without one is cut hard
/// at `limit`. Empty input yields one empty segment. A `limit` of zero is
/// treated as one.
///
/// ```
/// use kontragent::chunk::split;
///
/// assert_eq!(split("ab\ncd", 3), ["ab", "cd"]);
/// assert_eq!(split("abcdef", 4), ["abcd", "ef"]);
/// ```
pub fn split(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        // byte offset just past the first `limit + 1` chars (or end of text)
        let window_end = rest
            .char_indices()
            .nth(limit + 1)
            .map_or(rest.len(), |(i, _)| i);
        match rest[..window_end].rfind('\n') {
            Some(newline) => {
                chunks.push(rest[..newline].to_string());
                rest = &rest[newline + 1..];
            }
            None => {
                let cut = rest
                    .char_indices()
                    .nth(limit)
                    .map_or(rest.len(), |(i, _)| i);
                chunks.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
        }
    }
    chunks.push(rest.to_string());
    chunks
}
