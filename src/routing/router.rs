//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in table order
//! - Look up the first route matching method and path
//! - Return matched route or explicit RouteNotFound
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan, first match wins
//! - Replacement is a whole-table swap through [`SharedRouteTable`]

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::Method;

use crate::config::schema::RouteConfig;
use crate::config::validation::ValidationError;
use crate::error::{GatewayError, GatewayResult};
use crate::routing::route::{Introspection, Route, RouteTarget};

/// Outcome of a successful lookup.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Serve from the gateway itself.
    Introspect {
        route: Arc<Route>,
        endpoint: Introspection,
    },
    /// Forward to a backend.
    Proxy(Arc<Route>),
}

/// Ordered, read-only snapshot of enabled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Build a table from compiled routes, keeping their order.
    /// Disabled routes are dropped.
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .filter(Route::is_enabled)
                .map(Arc::new)
                .collect(),
        }
    }

    /// Compile stored records (already in store order) into a table.
    pub fn from_records(records: &[RouteConfig]) -> Result<Self, ValidationError> {
        let routes = records
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(routes))
    }

    /// First route, in table order, whose method filter and pattern both pass.
    pub fn find_route(&self, path: &str, method: &Method) -> GatewayResult<Arc<Route>> {
        for route in &self.routes {
            if route.matches(method, path) {
                tracing::debug!(pattern = %route.path_pattern(), %path, "Route matched");
                return Ok(Arc::clone(route));
            }

            if !route.method().allows(method) {
                tracing::trace!(
                    pattern = %route.path_pattern(),
                    route_method = %route.method(),
                    %method,
                    "Method mismatch"
                );
            }
        }

        Err(GatewayError::RouteNotFound {
            path: path.to_string(),
            method: method.to_string(),
        })
    }

    /// Look up a route and decide whether it is served locally or proxied.
    pub fn dispatch(&self, path: &str, method: &Method) -> GatewayResult<Dispatch> {
        let route = self.find_route(path, method)?;
        Ok(match route.target() {
            RouteTarget::Gateway => Dispatch::Introspect {
                endpoint: Introspection::for_path(path),
                route,
            },
            RouteTarget::Upstream { .. } => Dispatch::Proxy(route),
        })
    }

    /// Routes in table order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// The live route table, replaced wholesale on reload.
///
/// Readers take one snapshot per request and never observe a mix of old and
/// new routes.
#[derive(Debug)]
pub struct SharedRouteTable {
    current: ArcSwap<RouteTable>,
}

impl SharedRouteTable {
    pub fn new(table: RouteTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    /// Snapshot of the current table.
    pub fn load(&self) -> Arc<RouteTable> {
        self.current.load_full()
    }

    /// Publish a new table. In-flight requests keep the snapshot they loaded.
    pub fn replace(&self, table: RouteTable) {
        let count = table.len();
        self.current.store(Arc::new(table));
        tracing::info!(routes = count, "Route table replaced");
    }
}
