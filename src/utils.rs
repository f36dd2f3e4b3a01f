//! Hashing and keyword tokenization shared by the matcher and the filter parser.

use seahash::hash;

pub type Hash = u64;

/// Shortest run of keyword characters that is worth indexing a filter under.
pub const KEYWORD_MIN_LENGTH: usize = 3;

#[inline]
pub fn fast_hash(input: &str) -> Hash {
    hash(input.as_bytes()) as Hash
}

#[inline]
fn is_keyword_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'%'
}

/// Pushes the hash of every maximal run of keyword characters in `url` that is long enough to
/// be a keyword. `url` is expected to be lowercased already.
///
/// Unlike filter patterns, `*` has no meaning in a URL, so no runs are skipped here; the matcher
/// relies on this to never miss a bucket.
pub fn tokenize_url(url: &str, tokens: &mut Vec<Hash>) {
    let bytes = url.as_bytes();
    let mut start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if is_keyword_byte(b) {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            if i - s >= KEYWORD_MIN_LENGTH {
                tokens.push(fast_hash(&url[s..i]));
            }
        }
    }

    if let Some(s) = start {
        if bytes.len() - s >= KEYWORD_MIN_LENGTH {
            tokens.push(fast_hash(&url[s..]));
        }
    }
}

pub fn tokenize(url: &str) -> Vec<Hash> {
    let mut tokens = Vec::with_capacity(16);
    tokenize_url(url, &mut tokens);
    tokens
}

/// Runs of a wildcard pattern that must show up as a whole token in any URL the pattern matches.
///
/// A run qualifies only when both of its edges are fixed: a literal non-keyword character, a `^`
/// separator, or an anchored edge of the pattern. Runs touching `*` or an unanchored edge could be
/// glued to more keyword characters in the URL and are rejected.
pub fn keyword_candidates(pattern: &str, left_anchored: bool, right_anchored: bool) -> Vec<&str> {
    let bytes = pattern.as_bytes();
    let mut candidates = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !is_keyword_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_keyword_byte(bytes[i]) {
            i += 1;
        }
        let end = i;

        let left_ok = if start == 0 {
            left_anchored
        } else {
            bytes[start - 1] != b'*'
        };
        let right_ok = if end == bytes.len() {
            right_anchored
        } else {
            bytes[end] != b'*'
        };

        if left_ok && right_ok && end - start >= KEYWORD_MIN_LENGTH {
            candidates.push(&pattern[start..end]);
        }
    }

    candidates
}
