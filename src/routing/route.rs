//! The compiled route model.
//!
//! A [`Route`] is built from a stored [`RouteConfig`] record. Fields are
//! private; the pattern in particular never changes once a route exists.

use std::fmt;

use axum::http::Method;

use crate::config::schema::{RouteConfig, ANY_METHOD, GATEWAY_SERVICE};
use crate::config::validation::ValidationError;
use crate::routing::matcher;

/// Which request methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMethod {
    Any,
    Only(Method),
}

impl RouteMethod {
    /// Parse a stored method value. `ANY` is the wildcard sentinel.
    pub fn parse(value: &str) -> Option<Self> {
        if value == ANY_METHOD {
            return Some(RouteMethod::Any);
        }
        Method::from_bytes(value.as_bytes()).ok().map(RouteMethod::Only)
    }

    /// Exact, case-sensitive token comparison.
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            RouteMethod::Any => true,
            RouteMethod::Only(expected) => expected == method,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Any => f.write_str(ANY_METHOD),
            RouteMethod::Only(method) => f.write_str(method.as_str()),
        }
    }
}

/// Where a matched route sends the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Served by the gateway itself.
    Gateway,
    /// Proxied to a backend. An empty base URL defers to the service registry.
    Upstream { base_url: String },
}

/// Built-in endpoints of the gateway service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Introspection {
    Health,
    Routes,
    Unknown(String),
}

impl Introspection {
    /// Pick the endpoint for an exact request path.
    pub fn for_path(path: &str) -> Self {
        match path {
            "/health" => Introspection::Health,
            "/routes" => Introspection::Routes,
            other => Introspection::Unknown(other.to_string()),
        }
    }
}

/// One routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    id: i64,
    path_pattern: String,
    service_name: String,
    method: RouteMethod,
    auth_required: bool,
    rate_limit: i32,
    cache_ttl: i32,
    target_url: String,
    target: RouteTarget,
    enabled: bool,
}

impl Route {
    /// Compile a stored record.
    pub fn from_config(record: &RouteConfig) -> Result<Self, ValidationError> {
        let method =
            RouteMethod::parse(&record.method).ok_or_else(|| ValidationError::InvalidMethod {
                id: record.id,
                method: record.method.clone(),
            })?;

        let target = if record.service_name == GATEWAY_SERVICE {
            RouteTarget::Gateway
        } else {
            RouteTarget::Upstream {
                base_url: record.target_url.trim().to_string(),
            }
        };

        Ok(Self {
            id: record.id,
            path_pattern: record.path_pattern.clone(),
            service_name: record.service_name.clone(),
            method,
            auth_required: record.auth_required,
            rate_limit: record.rate_limit,
            cache_ttl: record.cache_ttl,
            target_url: record.target_url.clone(),
            target,
            enabled: record.enabled,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    pub fn auth_required(&self) -> bool {
        self.auth_required
    }

    /// Reserved; carried as data only.
    pub fn rate_limit(&self) -> i32 {
        self.rate_limit
    }

    /// Reserved; carried as data only.
    pub fn cache_ttl(&self) -> i32 {
        self.cache_ttl
    }

    /// The target URL exactly as stored.
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Method filter first, then pattern.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.allows(method) && matcher::matches(&self.path_pattern, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(service: &str, method: &str) -> RouteConfig {
        RouteConfig {
            id: 1,
            path_pattern: "/api/users/*".into(),
            service_name: service.into(),
            method: method.into(),
            auth_required: true,
            rate_limit: 100,
            cache_ttl: 60,
            target_url: "http://users:9001".into(),
            enabled: true,
        }
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(RouteMethod::parse("ANY"), Some(RouteMethod::Any));
        assert_eq!(RouteMethod::parse("GET"), Some(RouteMethod::Only(Method::GET)));
        assert!(RouteMethod::parse("").is_none());
        assert!(RouteMethod::parse("G ET").is_none());
    }

    #[test]
    fn test_method_is_case_sensitive() {
        let lower = RouteMethod::parse("get").unwrap();
        assert!(!lower.allows(&Method::GET));
        assert!(RouteMethod::Any.allows(&Method::DELETE));
    }

    #[test]
    fn test_gateway_service_is_tagged() {
        let route = Route::from_config(&record("gateway", "GET")).unwrap();
        assert_eq!(route.target(), &RouteTarget::Gateway);

        let route = Route::from_config(&record("users", "GET")).unwrap();
        assert_eq!(
            route.target(),
            &RouteTarget::Upstream { base_url: "http://users:9001".into() }
        );
    }

    #[test]
    fn test_reserved_fields_are_kept() {
        let route = Route::from_config(&record("users", "ANY")).unwrap();
        assert_eq!(route.rate_limit(), 100);
        assert_eq!(route.cache_ttl(), 60);
        assert!(route.auth_required());
    }

    #[test]
    fn test_matches_checks_method_then_pattern() {
        let route = Route::from_config(&record("users", "GET")).unwrap();
        assert!(route.matches(&Method::GET, "/api/users/7"));
        assert!(!route.matches(&Method::POST, "/api/users/7"));
        assert!(!route.matches(&Method::GET, "/api/orders/7"));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let err = Route::from_config(&record("users", "NOT A METHOD")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMethod { id: 1, .. }));
    }

    #[test]
    fn test_introspection_paths() {
        assert_eq!(Introspection::for_path("/health"), Introspection::Health);
        assert_eq!(Introspection::for_path("/routes"), Introspection::Routes);
        assert_eq!(
            Introspection::for_path("/health/"),
            Introspection::Unknown("/health/".into())
        );
    }
}
