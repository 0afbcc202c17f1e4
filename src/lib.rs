//! HTTP API gateway library.
//!
//! Routes inbound requests by path pattern and method to backend services,
//! serves its own `/health` and `/routes` endpoints, and streams backend
//! responses back under a fixed deadline.

pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod introspection;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteTable, SharedRouteTable};
