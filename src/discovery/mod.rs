//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied route with empty target_url:
//!     → ServiceRegistry::resolve(service_name)
//!     → base URL (http://address:port)
//!     → proxy::resolver joins the request path
//!
//! Startup (register_self = true):
//!     → ServiceRegistry::register(gateway, address, port, "/health")
//! Shutdown:
//!     → ServiceRegistry::deregister(id)
//! ```
//!
//! # Design Decisions
//! - One healthy instance is returned; there is no load balancing
//! - Registries are consulted per request; nothing is cached

pub mod consul;
pub mod static_registry;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::schema::{RegistryConfig, RegistryKind};

pub use consul::ConsulRegistry;
pub use static_registry::StaticRegistry;

/// Errors from a service registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport-level failure talking to the registry.
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-success status.
    #[error("registry returned status {status} for {operation}")]
    Status { operation: &'static str, status: u16 },

    /// No passing instance is known for the service.
    #[error("no healthy services found for {0}")]
    NoHealthyInstance(String),

    /// The registry address cannot be turned into a URL.
    #[error("invalid registry address {0:?}")]
    InvalidAddress(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registration and lookup of named services.
#[async_trait]
pub trait ServiceRegistry: Send + Sync + std::fmt::Debug {
    /// Register an instance with an HTTP health check. Returns the service id.
    async fn register(
        &self,
        name: &str,
        address: &str,
        port: u16,
        health_check_path: &str,
    ) -> RegistryResult<String>;

    /// Remove a previously registered instance.
    async fn deregister(&self, service_id: &str) -> RegistryResult<()>;

    /// Base URL of a healthy instance of `name`.
    async fn resolve(&self, name: &str) -> RegistryResult<String>;
}

/// Build the registry selected by configuration, if any.
pub fn from_config(config: &RegistryConfig) -> RegistryResult<Option<Arc<dyn ServiceRegistry>>> {
    let registry: Arc<dyn ServiceRegistry> = match config.kind {
        RegistryKind::None => return Ok(None),
        RegistryKind::Static => Arc::new(StaticRegistry::new(config.services.clone())),
        RegistryKind::Consul => Arc::new(ConsulRegistry::new(&config.address)?),
    };
    Ok(Some(registry))
}
