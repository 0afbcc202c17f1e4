//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → RouteSource (enabled routes, pattern descending)
//!     → RouteTable built once and handed to the gateway
//!
//! On reload (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new route records
//!     → validation.rs validates
//!     → new RouteTable, atomic swap of Arc<RouteTable>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, FileRouteSource, RouteSource, StaticRouteSource};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::RegistryConfig;
pub use schema::RegistryKind;
pub use schema::RouteConfig;
