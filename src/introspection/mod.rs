//! Endpoints served by the gateway itself.
//!
//! Reached through routes whose service is `gateway`. `/health` and `/routes`
//! are the only endpoints; any other path under the gateway service is a 404.

pub mod handlers;

use axum::response::Response;

use crate::error::{GatewayError, GatewayResult};
use crate::routing::{Introspection, RouteTable};

/// Serve an introspection endpoint from the given table snapshot.
pub fn respond(endpoint: &Introspection, table: &RouteTable) -> GatewayResult<Response> {
    match endpoint {
        Introspection::Health => Ok(handlers::health()),
        Introspection::Routes => Ok(handlers::routes(table)),
        Introspection::Unknown(path) => {
            Err(GatewayError::IntrospectionNotFound { path: path.clone() })
        }
    }
}
