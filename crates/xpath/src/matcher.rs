//! Longest-match engine (C2) over path-shaped glob patterns.
//!
//! The specification's contract-level algorithm describes a fragile,
//! hand-rolled character scanner (see `DESIGN.md` for the citation). This
//! implementation instead compiles both the pattern and the instance path
//! into bracket-aware segments — splitting on `/` only outside a `[...]`
//! predicate, since a predicate value (e.g. a prefix like `10.0.0.0/24`) may
//! itself contain a `/` — and requires the pattern's segments to be an exact
//! or wildcarded prefix of the instance's segments. This preserves every
//! contract-level guarantee (zero on no match, longest-prefix wins, root
//! scope matches everything) without the original's index arithmetic.

/// Returns `true` if `xpath` denotes the root scope, which matches every
/// registered pattern unconditionally.
#[must_use]
pub fn is_root_scope(xpath: &str) -> bool {
    xpath == "/" || xpath == "/*"
}

/// Splits `path` into `/`-delimited segments, treating `/` inside a
/// bracketed key predicate (`[...]`) as part of the segment rather than a
/// delimiter.
fn split_segments(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0usize;
    let mut depth: i32 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => depth = (depth - 1).max(0),
            b'/' if depth == 0 => {
                if i > start {
                    segments.push(&path[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < bytes.len() {
        segments.push(&path[start..]);
    }
    segments
}

/// Strips a single trailing `*` (subtree wildcard), if present.
fn strip_trailing_star(s: &str) -> &str {
    s.strip_suffix('*').unwrap_or(s)
}

/// Computes the longest-match length of `pattern` against `instance`.
///
/// Returns `0` if `pattern` (after trimming a trailing `*`) is not, segment
/// by segment, a prefix of `instance` (a pattern segment of `*` matches any
/// single instance segment). Otherwise returns the number of pattern
/// segments matched — a positive value that grows with specificity, so
/// comparing two calls' results picks the longer (more specific) match.
#[must_use]
pub fn match_len(pattern: &str, instance: &str) -> usize {
    let pattern = strip_trailing_star(pattern);
    let instance = strip_trailing_star(instance);
    if pattern.is_empty() || instance.is_empty() {
        return 0;
    }

    let pattern_segments = split_segments(pattern);
    let instance_segments = split_segments(instance);
    if pattern_segments.is_empty() || pattern_segments.len() > instance_segments.len() {
        return 0;
    }

    let mut matched = 0usize;
    for (p, x) in pattern_segments.iter().zip(instance_segments.iter()) {
        if *p == "*" || *p == *x {
            matched += 1;
        } else {
            break;
        }
    }

    if matched == pattern_segments.len() {
        matched
    } else {
        0
    }
}
