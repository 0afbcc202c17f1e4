//! Header filtering across the proxy boundary.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Preserve every value of multi-valued headers, in order
//!
//! # Design Decisions
//! - The skip set is fixed and compared case-insensitively
//! - Gateway-added headers (X-Gateway, X-Forwarded-For, X-Original-Host) are
//!   injected by the executor after filtering

use axum::http::HeaderMap;

/// Headers meaningful for a single connection only; never forwarded.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "Connection",
    "Keep-Alive",
    "Proxy-Authenticate",
    "Proxy-Authorization",
    "Te",
    "Trailers",
    "Transfer-Encoding",
    "Upgrade",
];

/// Returns true if `name` is in the hop-by-hop skip set, ignoring case.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|skip| skip.eq_ignore_ascii_case(name))
}

/// Append every forwardable header of `src` to `dst`.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for (name, value) in src.iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_skip_set_any_case() {
        for name in HOP_BY_HOP_HEADERS {
            assert!(is_hop_by_hop(name));
            assert!(is_hop_by_hop(&name.to_lowercase()));
            assert!(is_hop_by_hop(&name.to_uppercase()));
        }
        assert!(is_hop_by_hop("kEeP-aLiVe"));
        assert!(!is_hop_by_hop("Content-Type"));
        assert!(!is_hop_by_hop("Trailer"));
        assert!(!is_hop_by_hop("Authorization"));
    }

    #[test]
    fn test_copy_strips_hop_by_hop() {
        let mut src = HeaderMap::new();
        for name in HOP_BY_HOP_HEADERS {
            let name = HeaderName::from_bytes(name.to_uppercase().as_bytes()).unwrap();
            src.insert(name, HeaderValue::from_static("x"));
        }
        src.insert("content-type", HeaderValue::from_static("application/json"));
        src.insert("authorization", HeaderValue::from_static("Bearer t"));

        let mut dst = HeaderMap::new();
        copy_headers(&src, &mut dst);

        assert_eq!(dst.len(), 2);
        for name in HOP_BY_HOP_HEADERS {
            assert!(!dst.contains_key(name.to_lowercase().as_str()));
        }
        assert_eq!(dst["content-type"], "application/json");
        assert_eq!(dst["authorization"], "Bearer t");
    }

    #[test]
    fn test_copy_keeps_all_values_in_order() {
        let mut src = HeaderMap::new();
        src.append("set-cookie", HeaderValue::from_static("a=1"));
        src.append("set-cookie", HeaderValue::from_static("b=2"));
        src.append("set-cookie", HeaderValue::from_static("c=3"));

        let mut dst = HeaderMap::new();
        copy_headers(&src, &mut dst);

        let values: Vec<_> = dst.get_all("set-cookie").iter().collect();
        assert_eq!(values, vec!["a=1", "b=2", "c=3"]);
    }

    #[test]
    fn test_copy_appends_to_existing() {
        let mut src = HeaderMap::new();
        src.insert("x-trace", HeaderValue::from_static("from-src"));

        let mut dst = HeaderMap::new();
        dst.insert("x-trace", HeaderValue::from_static("already-there"));
        copy_headers(&src, &mut dst);

        let values: Vec<_> = dst.get_all("x-trace").iter().collect();
        assert_eq!(values, vec!["already-there", "from-src"]);
    }
}
