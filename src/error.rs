//! Per-request error taxonomy for the gateway.
//!
//! Every error is handled where it is detected: it is logged with the request
//! context and turned into a status code plus a generic plain-text message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that terminate a single proxied request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No route matched the path and method.
    #[error("route not found for path: {path}, method: {method}")]
    RouteNotFound { path: String, method: String },

    /// Auth-gated route reached without a credential.
    #[error("unauthorized access to route: {pattern}")]
    Unauthorized { pattern: String },

    /// Path under the gateway service with no introspection handler.
    #[error("unknown endpoint: {path}")]
    IntrospectionNotFound { path: String },

    /// The configured or resolved target URL could not be used.
    #[error("invalid target URL {url:?}: {reason}")]
    InvalidTargetUrl { url: String, reason: String },

    /// The service registry could not produce a base URL.
    #[error("failed to resolve service {service}: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    /// The outbound call failed before a response head arrived.
    #[error("upstream {target} unreachable: {reason}")]
    UpstreamUnreachable { target: String, reason: String },

    /// Streaming the backend body to the client failed after the head was sent.
    #[error("failed to copy response body: {reason}")]
    BodyCopyFailure { reason: String },
}

impl GatewayError {
    /// Status code sent to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } | GatewayError::IntrospectionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidTargetUrl { .. }
            | GatewayError::ServiceUnavailable { .. }
            | GatewayError::UpstreamUnreachable { .. }
            | GatewayError::BodyCopyFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. Only the not-found message names request details.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::RouteNotFound { .. } => self.to_string(),
            GatewayError::Unauthorized { .. } => "Unauthorized".to_string(),
            GatewayError::IntrospectionNotFound { .. } => "Not found".to_string(),
            GatewayError::InvalidTargetUrl { .. } => "Failed to build target URL".to_string(),
            GatewayError::ServiceUnavailable { .. } => "Failed to resolve service".to_string(),
            GatewayError::UpstreamUnreachable { .. } => "Failed to proxy request".to_string(),
            GatewayError::BodyCopyFailure { .. } => "Failed to copy response body".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

/// Result type for request handling.
pub type GatewayResult<T> = Result<T, GatewayError>;
