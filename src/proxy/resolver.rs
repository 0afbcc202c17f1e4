//! Target URL resolution.
//!
//! Wildcard routes strip their prefix from the request path before it is
//! joined onto the backend base path; exact routes forward the full path.
//! The inbound query string and fragment are not carried over.

use std::sync::Arc;

use url::Url;

use crate::discovery::ServiceRegistry;
use crate::error::{GatewayError, GatewayResult};
use crate::routing::matcher;
use crate::routing::{Route, RouteTarget};

/// Join `request_path` onto `base_url` according to the route pattern.
pub fn resolve(base_url: &str, route_pattern: &str, request_path: &str) -> GatewayResult<Url> {
    let mut url = Url::parse(base_url).map_err(|e| GatewayError::InvalidTargetUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(GatewayError::InvalidTargetUrl {
            url: base_url.to_string(),
            reason: "URL cannot carry a path".to_string(),
        });
    }

    let target_path = match matcher::wildcard_prefix(route_pattern) {
        Some(prefix) => request_path.strip_prefix(prefix).unwrap_or(request_path),
        None => request_path,
    };

    let base_path = url.path();
    let base_path = base_path.strip_suffix('/').unwrap_or(base_path);
    let joined = format!("{base_path}{target_path}");
    url.set_path(&joined);

    Ok(url)
}

/// Produces the outbound URL for a proxied route.
///
/// Static `target_url` values are used as-is; an empty one is looked up in
/// the service registry by service name. Both go through [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    registry: Option<Arc<dyn ServiceRegistry>>,
}

impl TargetResolver {
    pub fn new(registry: Option<Arc<dyn ServiceRegistry>>) -> Self {
        Self { registry }
    }

    /// Base URL the route forwards to.
    pub async fn base_url(&self, route: &Route) -> GatewayResult<String> {
        let base_url = match route.target() {
            RouteTarget::Upstream { base_url } => base_url,
            RouteTarget::Gateway => {
                return Err(GatewayError::InvalidTargetUrl {
                    url: route.target_url().to_string(),
                    reason: "gateway routes are not proxied".to_string(),
                })
            }
        };

        if !base_url.is_empty() {
            return Ok(base_url.clone());
        }

        let registry = self.registry.as_ref().ok_or_else(|| GatewayError::InvalidTargetUrl {
            url: String::new(),
            reason: format!("no target URL for service {} and no registry", route.service_name()),
        })?;

        registry
            .resolve(route.service_name())
            .await
            .map_err(|e| GatewayError::ServiceUnavailable {
                service: route.service_name().to_string(),
                reason: e.to_string(),
            })
    }

    /// Absolute outbound URL for `route` and `request_path`.
    pub async fn resolve(&self, route: &Route, request_path: &str) -> GatewayResult<Url> {
        let base_url = self.base_url(route).await?;
        resolve(&base_url, route.path_pattern(), request_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::config::schema::RouteConfig;
    use crate::discovery::StaticRegistry;

    fn route(pattern: &str, service: &str, target: &str) -> Route {
        Route::from_config(&RouteConfig {
            id: 1,
            path_pattern: pattern.into(),
            service_name: service.into(),
            method: "ANY".into(),
            auth_required: false,
            rate_limit: 0,
            cache_ttl: 0,
            target_url: target.into(),
            enabled: true,
        })
        .unwrap()
    }

    #[test]
    fn test_exact_route_keeps_full_path() {
        let url = resolve("http://svc:9000", "/api/users", "/api/users").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/api/users");
    }

    #[test]
    fn test_wildcard_route_strips_prefix() {
        let url = resolve("http://products:9000", "/api/products/*", "/api/products/42").unwrap();
        assert_eq!(url.as_str(), "http://products:9000/42");
    }

    #[test]
    fn test_base_path_is_kept() {
        let url = resolve("http://svc:9000/v2/", "/api/users/*", "/api/users/7").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/v2/7");

        let url = resolve("http://svc:9000/v2", "/api/users", "/api/users").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/v2/api/users");
    }

    #[test]
    fn test_wildcard_with_path_equal_to_prefix() {
        let url = resolve("http://svc:9000/base", "/api/users/*", "/api/users").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/base");
    }

    #[test]
    fn test_wildcard_raw_prefix_remainder() {
        // Sibling-prefix match: remainder starts mid-segment.
        let url = resolve("http://svc:9000", "/api/product/*", "/api/products/1").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/s/1");
    }

    #[test]
    fn test_wildcard_fallback_uses_full_path() {
        let url = resolve("http://svc:9000", "/api/users/*", "/other/path").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/other/path");
    }

    #[test]
    fn test_base_query_is_kept() {
        let url = resolve("http://svc:9000/?tenant=a", "/x", "/x").unwrap();
        assert_eq!(url.as_str(), "http://svc:9000/x?tenant=a");
    }

    #[test]
    fn test_invalid_target_url() {
        for bad in ["", "not a url", "/relative/path", "mailto:someone@example.com"] {
            let err = resolve(bad, "/x", "/x").unwrap_err();
            assert!(matches!(err, GatewayError::InvalidTargetUrl { .. }), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_static_and_registry_paths_agree() {
        let registry = Arc::new(StaticRegistry::new(HashMap::from([(
            "products".to_string(),
            "http://products:9000".to_string(),
        )])));
        let resolver = TargetResolver::new(Some(registry));

        let static_route = route("/api/products/*", "products", "http://products:9000");
        let registry_route = route("/api/products/*", "products", "");

        let a = resolver.resolve(&static_route, "/api/products/42").await.unwrap();
        let b = resolver.resolve(&registry_route, "/api/products/42").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "http://products:9000/42");
    }

    #[tokio::test]
    async fn test_registry_failures() {
        let without_registry = TargetResolver::default();
        let err = without_registry
            .resolve(&route("/api/x", "x", ""), "/api/x")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidTargetUrl { .. }));

        let with_registry = TargetResolver::new(Some(Arc::new(StaticRegistry::default())));
        let err = with_registry
            .resolve(&route("/api/x", "x", ""), "/api/x")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ServiceUnavailable { .. }));
    }
}
