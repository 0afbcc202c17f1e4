//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered table scan)
//!     → matcher.rs (exact or `/*` prefix pattern)
//!     → Return: Dispatch (introspect | proxy) or RouteNotFound
//!
//! Route Compilation (at startup and on reload):
//!     RouteConfig[] (enabled, pattern descending)
//!     → route.rs (parse method, tag gateway vs upstream target)
//!     → Freeze as immutable RouteTable
//!     → Publish through SharedRouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at load time, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by the store's pattern-descending order)

pub mod matcher;
pub mod route;
pub mod router;

pub use route::{Introspection, Route, RouteMethod, RouteTarget};
pub use router::{Dispatch, RouteTable, SharedRouteTable};
