//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Method value meaning "match regardless of method".
pub const ANY_METHOD: &str = "ANY";

/// Service name reserved for the gateway's own introspection endpoints.
pub const GATEWAY_SERVICE: &str = "gateway";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Service registry used to resolve targets by service name.
    pub registry: RegistryConfig,

    /// Route table reload settings.
    pub reload: ReloadConfig,

    /// Stored route records.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// A stored route record, as kept by the route configuration store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique, stable identifier.
    pub id: i64,

    /// Exact path or prefix wildcard ending in `/*`.
    pub path_pattern: String,

    /// Logical backend name; `gateway` is reserved for introspection.
    pub service_name: String,

    /// HTTP method token, or `ANY`.
    #[serde(default = "default_method")]
    pub method: String,

    /// Require a non-empty `Authorization` header.
    #[serde(default)]
    pub auth_required: bool,

    /// Reserved. Loaded and kept, never consulted.
    #[serde(default)]
    pub rate_limit: i32,

    /// Reserved. Loaded and kept, never consulted.
    #[serde(default)]
    pub cache_ttl: i32,

    /// Absolute backend base URL. Empty means "ask the service registry".
    #[serde(default)]
    pub target_url: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_method() -> String {
    ANY_METHOD.to_string()
}

fn default_enabled() -> bool {
    true
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a whole upstream round trip, body included, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}, expected pretty or json")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Which service registry backs name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Only static `target_url` values are used.
    #[default]
    None,
    /// Names resolve through the `services` table below.
    Static,
    /// Names resolve through a Consul agent.
    Consul,
}

/// Service registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub kind: RegistryKind,

    /// Consul agent address (host:port).
    pub address: String,

    /// Static service name -> base URL map.
    pub services: HashMap<String, String>,

    /// Register the gateway itself with the registry at startup.
    pub register_self: bool,

    /// Name the gateway registers under.
    pub service_name: String,

    /// Address other services reach the gateway on.
    pub advertise_address: String,

    /// Port other services reach the gateway on.
    pub advertise_port: u16,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kind: RegistryKind::None,
            address: "localhost:8500".to_string(),
            services: HashMap::new(),
            register_self: false,
            service_name: GATEWAY_SERVICE.to_string(),
            advertise_address: "127.0.0.1".to_string(),
            advertise_port: 8000,
        }
    }
}

/// Route table reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the config file and swap in a new route table on change.
    pub watch: bool,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self { watch: true }
    }
}
