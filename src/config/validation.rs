//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route records: unique ids, pattern syntax, method tokens
//! - Check that every proxied route has somewhere to go
//! - Validate value ranges (timeouts > 0, bind and metrics addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Unparsable target URLs are not rejected here; they fail per request

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, RegistryKind, RouteConfig, ANY_METHOD, GATEWAY_SERVICE};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.upstream_secs must be greater than zero")]
    ZeroTimeout,

    #[error("route id {0} is used more than once")]
    DuplicateRouteId(i64),

    #[error("route {id}: path pattern {pattern:?} must start with '/'")]
    PatternNotAbsolute { id: i64, pattern: String },

    #[error("route {id}: '*' is only allowed as a trailing \"/*\" in {pattern:?}")]
    MisplacedWildcard { id: i64, pattern: String },

    #[error("route {id}: {method:?} is not an HTTP method or ANY")]
    InvalidMethod { id: i64, method: String },

    #[error("route {id}: service {service:?} has no target_url and no registry can resolve it")]
    MissingTarget { id: i64, service: String },

    #[error("registry.address must be set for the consul registry")]
    MissingRegistryAddress,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.registry.kind == RegistryKind::Consul && config.registry.address.trim().is_empty() {
        errors.push(ValidationError::MissingRegistryAddress);
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !seen.insert(route.id) {
            errors.push(ValidationError::DuplicateRouteId(route.id));
        }
        validate_route(config, route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(config: &GatewayConfig, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    let pattern = &route.path_pattern;

    if !pattern.starts_with('/') {
        errors.push(ValidationError::PatternNotAbsolute {
            id: route.id,
            pattern: pattern.clone(),
        });
    }

    let body = pattern.strip_suffix("/*").unwrap_or(pattern);
    if body.contains('*') {
        errors.push(ValidationError::MisplacedWildcard {
            id: route.id,
            pattern: pattern.clone(),
        });
    }

    if route.method != ANY_METHOD && Method::from_bytes(route.method.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidMethod {
            id: route.id,
            method: route.method.clone(),
        });
    }

    let proxied = route.service_name != GATEWAY_SERVICE;
    if route.enabled && proxied && route.target_url.trim().is_empty() {
        let resolvable = match config.registry.kind {
            RegistryKind::None => false,
            RegistryKind::Static => config.registry.services.contains_key(&route.service_name),
            RegistryKind::Consul => true,
        };
        if !resolvable {
            errors.push(ValidationError::MissingTarget {
                id: route.id,
                service: route.service_name.clone(),
            });
        }
    }
}
