//! Route pattern matching.
//!
//! # Responsibilities
//! - Exact match: pattern equals path
//! - Prefix wildcard: pattern ending in `/*` matches any path starting with
//!   the pattern minus that suffix
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The wildcard prefix test is a raw string prefix, with no path segment
//!   boundary: `/api/product/*` matches `/api/products/1`
//! - No regex, no named parameters

/// Suffix that turns a pattern into a prefix wildcard.
pub const WILDCARD_SUFFIX: &str = "/*";

/// The prefix of a wildcard pattern, or `None` for exact patterns.
pub fn wildcard_prefix(pattern: &str) -> Option<&str> {
    pattern.strip_suffix(WILDCARD_SUFFIX)
}

/// Returns true if `path` matches `pattern`.
pub fn matches(pattern: &str, path: &str) -> bool {
    if pattern == path {
        return true;
    }

    match wildcard_prefix(pattern) {
        Some(prefix) => path.starts_with(prefix),
        None => false,
    }
}
