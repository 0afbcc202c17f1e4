//! Configuration loading from disk.
//!
//! Also hosts the route configuration store boundary: a [`RouteSource`]
//! yields the enabled route records, ordered by pattern descending.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    for route in &config.routes {
        if !route.target_url.is_empty() && url::Url::parse(&route.target_url).is_err() {
            tracing::warn!(
                route_id = route.id,
                target_url = %route.target_url,
                "Route target URL does not parse; requests to it will fail"
            );
        }
    }

    Ok(config)
}

/// Keep enabled records only, ordered by pattern descending.
///
/// Ties are broken by ascending id so the order is total.
pub fn active_routes(mut records: Vec<RouteConfig>) -> Vec<RouteConfig> {
    records.retain(|r| r.enabled);
    records.sort_by(|a, b| {
        b.path_pattern
            .cmp(&a.path_pattern)
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}

/// A store of route records.
///
/// Implementations return every enabled route, ordered by path pattern
/// descending (byte-wise). The gateway relies on that order for
/// first-match-wins lookups.
pub trait RouteSource: Send + Sync {
    fn load_routes(&self) -> Result<Vec<RouteConfig>, ConfigError>;
}

/// Routes read from the `[[routes]]` records of a TOML config file.
#[derive(Debug, Clone)]
pub struct FileRouteSource {
    path: PathBuf,
}

impl FileRouteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteSource for FileRouteSource {
    fn load_routes(&self) -> Result<Vec<RouteConfig>, ConfigError> {
        let config = load_config(&self.path)?;
        Ok(active_routes(config.routes))
    }
}

/// Routes held in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRouteSource {
    records: Vec<RouteConfig>,
}

impl StaticRouteSource {
    pub fn new(records: Vec<RouteConfig>) -> Self {
        Self { records }
    }
}

impl RouteSource for StaticRouteSource {
    fn load_routes(&self) -> Result<Vec<RouteConfig>, ConfigError> {
        Ok(active_routes(self.records.clone()))
    }
}
