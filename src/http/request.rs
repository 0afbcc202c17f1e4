//! Request identification.
//!
//! # Responsibilities
//! - Give every inbound request an `x-request-id` (UUID v4) unless it has one
//! - Echo the id on the response
//! - Expose the id to handlers for log correlation
//! - Percent-decode the request path before it is matched
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The id travels upstream with the other forwarded headers

use std::borrow::Cow;

use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Outermost layer: assigns ids to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid)
}

/// Copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID.clone())
}

/// Request id from the inbound headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Request path with percent-escapes decoded.
///
/// Paths whose escapes do not decode to UTF-8 are used as received.
pub fn decoded_path(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
