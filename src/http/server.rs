//! HTTP server setup and request orchestration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener, stop on the shutdown broadcast
//! - Dispatch each request against one route table snapshot
//! - Serve introspection locally, gate auth, forward everything else
//! - Log failures with path, method and route pattern; record metrics

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::discovery::ServiceRegistry;
use crate::error::{GatewayError, GatewayResult};
use crate::http::request::{
    decoded_path, propagate_request_id_layer, request_id, set_request_id_layer,
};
use crate::http::response::StreamContext;
use crate::introspection;
use crate::observability::metrics;
use crate::proxy::{Outbound, ProxyExecutor, TargetResolver};
use crate::routing::{Dispatch, Route, SharedRouteTable};
use crate::security::auth;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<SharedRouteTable>,
    pub resolver: TargetResolver,
    pub executor: ProxyExecutor,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    routes: Arc<SharedRouteTable>,
}

impl HttpServer {
    /// Create a server over an already built route table.
    pub fn new(
        config: &GatewayConfig,
        routes: Arc<SharedRouteTable>,
        registry: Option<Arc<dyn ServiceRegistry>>,
    ) -> Self {
        let state = AppState {
            routes: Arc::clone(&routes),
            resolver: TargetResolver::new(registry),
            executor: ProxyExecutor::new(Duration::from_secs(config.timeouts.upstream_secs)),
        };

        Self {
            router: Self::build_router(state),
            routes,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Live route table the handlers read from.
    pub fn routes(&self) -> Arc<SharedRouteTable> {
        Arc::clone(&self.routes)
    }

    /// Run the server until a shutdown signal arrives, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.load().len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler.
/// Looks up the route, then serves it locally or forwards it.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = decoded_path(request.uri().path()).into_owned();
    let request_id = request_id(request.headers()).to_string();

    // Missing when the router is driven without a socket (tests).
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    // One snapshot for the whole request, reloads notwithstanding.
    let table = state.routes.load();

    let (route, result) = match table.dispatch(&path, &method) {
        Ok(Dispatch::Introspect { route, endpoint }) => {
            let result = introspection::respond(&endpoint, &table);
            (Some(route), result)
        }
        Ok(Dispatch::Proxy(route)) => {
            let result = forward(&state, &route, request, path.clone(), client_ip).await;
            (Some(route), result)
        }
        Err(e) => (None, Err(e)),
    };

    let pattern = route
        .as_deref()
        .map(Route::path_pattern)
        .unwrap_or(metrics::NO_ROUTE);

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            log_failure(&err, &request_id, &method, &path, pattern);
            err.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), pattern, start_time);
    response
}

/// Auth gate, target resolution and the upstream call. `path` is the
/// decoded request path the route matched.
async fn forward(
    state: &AppState,
    route: &Route,
    request: Request<Body>,
    path: String,
    client_ip: Option<IpAddr>,
) -> GatewayResult<Response> {
    if route.auth_required() && !auth::authorized(request.headers()) {
        return Err(GatewayError::Unauthorized {
            pattern: route.path_pattern().to_string(),
        });
    }

    let target = state.resolver.resolve(route, &path).await?;

    tracing::debug!(
        method = %request.method(),
        path = %path,
        service = %route.service_name(),
        target = %target,
        "Forwarding request"
    );

    let (parts, body) = request.into_parts();
    state
        .executor
        .execute(Outbound {
            method: parts.method.clone(),
            target: &target,
            headers: &parts.headers,
            body,
            client_ip,
            context: StreamContext {
                method: parts.method,
                path,
                pattern: route.path_pattern().to_string(),
            },
        })
        .await
}

fn log_failure(
    err: &GatewayError,
    request_id: &str,
    method: &axum::http::Method,
    path: &str,
    pattern: &str,
) {
    if err.status().is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            pattern = %pattern,
            error = %err,
            "Request failed"
        );
    } else {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            pattern = %pattern,
            error = %err,
            "Request rejected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    use crate::config::schema::RouteConfig;
    use crate::routing::RouteTable;

    fn record(id: i64, pattern: &str, service: &str, method: &str, target: &str) -> RouteConfig {
        RouteConfig {
            id,
            path_pattern: pattern.into(),
            service_name: service.into(),
            method: method.into(),
            auth_required: false,
            rate_limit: 0,
            cache_ttl: 0,
            target_url: target.into(),
            enabled: true,
        }
    }

    fn server(records: Vec<RouteConfig>) -> HttpServer {
        let table = RouteTable::from_records(&records).unwrap();
        HttpServer::new(
            &GatewayConfig::default(),
            Arc::new(SharedRouteTable::new(table)),
            None,
        )
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(vec![record(1, "/health", "gateway", "GET", "")]);
        let response = server.router().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_text(response).await, "Gateway is healthy!");
    }

    #[tokio::test]
    async fn test_percent_encoded_path_matches_decoded_route() {
        let server = server(vec![record(1, "/health", "gateway", "GET", "")]);
        let response = server.router().oneshot(get("/%68ealth")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Gateway is healthy!");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_404() {
        let server = server(vec![record(1, "/health", "gateway", "GET", "")]);
        let response = server.router().oneshot(get("/unknown")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("/unknown"));
        assert!(body.contains("GET"));
    }

    #[tokio::test]
    async fn test_method_mismatch_is_404() {
        let server = server(vec![record(1, "/health", "gateway", "GET", "")]);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_gate_rejects_before_resolution() {
        // The target is unparsable: reaching the resolver would give 500.
        let mut secured = record(1, "/api/orders", "orders", "ANY", "::not-a-url::");
        secured.auth_required = true;
        let server = server(vec![secured]);

        let response = server.router().oneshot(get("/api/orders")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Unauthorized");

        let request = Request::builder()
            .uri("/api/orders")
            .header(header::AUTHORIZATION, "Bearer token")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Failed to build target URL");
    }

    #[tokio::test]
    async fn test_unknown_gateway_path_is_404() {
        let server = server(vec![record(1, "/gateway/*", "gateway", "ANY", "")]);
        let response = server.router().oneshot(get("/gateway/status")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not found");
    }

    #[tokio::test]
    async fn test_reload_is_seen_by_next_request() {
        let server = server(vec![record(1, "/health", "gateway", "GET", "")]);
        let router = server.router();

        let reloaded = RouteTable::from_records(&[record(2, "/routes", "gateway", "GET", "")]);
        server.routes().replace(reloaded.unwrap());

        let response = router.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router.oneshot(get("/routes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.starts_with("Configured Routes (1):"));
    }
}
