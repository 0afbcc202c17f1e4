//! Presence gate for routes flagged `auth_required`.
//!
//! Only checks that a credential was sent. Nothing about the credential is
//! parsed or verified.

use axum::http::{header::AUTHORIZATION, HeaderMap};

/// True iff the first `Authorization` header is present and non-empty.
pub fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .map(|value| !value.as_bytes().is_empty())
        .unwrap_or(false)
}
