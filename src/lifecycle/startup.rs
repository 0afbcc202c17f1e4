//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the route table and the service registry
//! - Bind the listener, register with the registry, serve
//! - Keep the route table current (file watch, SIGHUP)
//! - Deregister on the way out
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)
//! - A reload that fails keeps the table already in service

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::config::loader::{active_routes, load_config};
use crate::config::schema::{LogFormat, RegistryConfig, RouteConfig};
use crate::config::validation::ValidationError;
use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigError, FileRouteSource, RouteSource};
use crate::discovery::{self, RegistryError, ServiceRegistry};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::{logging, metrics};
use crate::routing::{RouteTable, SharedRouteTable};

/// Path the registry health check probes.
pub const HEALTH_CHECK_PATH: &str = "/health";

/// Command-line inputs to startup.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub verbose: bool,
    /// Overrides `[observability] log_format` when set.
    pub log_format: Option<LogFormat>,
}

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build route table: {0}")]
    Routes(#[from] ValidationError),

    #[error("service registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the gateway and run it until shutdown.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    // 1. Configuration
    let mut config = load_config(&options.config_path)?;
    if let Some(format) = options.log_format {
        config.observability.log_format = format;
    }

    // 2. Logging, then metrics
    logging::init(&config.observability, options.verbose);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %options.config_path.display(),
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        routes = config.routes.len(),
        "api-gateway starting"
    );

    if config.observability.metrics_enabled {
        let addr = metrics_address(&config.observability.metrics_address)?;
        metrics::init_metrics(addr);
    }

    // 3. Route table
    let table = RouteTable::from_records(&active_routes(config.routes.clone()))?;
    tracing::info!(routes = table.len(), "Route table built");
    let routes = Arc::new(SharedRouteTable::new(table));

    // 4. Service registry
    let registry = discovery::from_config(&config.registry)?;
    let server = HttpServer::new(&config, Arc::clone(&routes), registry.clone());

    // 5. Listener
    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // 6. Self-registration
    let registration = match registry.as_deref() {
        Some(registry) => register_self(&config.registry, registry).await?,
        None => {
            if config.registry.register_self {
                tracing::warn!("register_self is set but no registry is configured");
            }
            None
        }
    };

    // 7. Signals and reload
    let shutdown = Shutdown::new();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    signals::spawn_signal_handler(shutdown.clone(), reload_tx);

    let (_watcher, file_rx) = if config.reload.watch {
        let (watcher, rx) = ConfigWatcher::new(&options.config_path);
        match watcher.run() {
            Ok(handle) => (Some(handle), Some(rx)),
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, file reload disabled");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    spawn_reloader(
        Arc::clone(&routes),
        FileRouteSource::new(&options.config_path),
        reload_rx,
        file_rx,
        shutdown.subscribe(),
    );

    // 8. Serve until shutdown
    server.run(listener, shutdown.subscribe()).await?;

    // 9. Deregister
    if let (Some(registry), Some(id)) = (registry.as_deref(), registration) {
        if let Err(e) = registry.deregister(&id).await {
            tracing::error!(id = %id, error = %e, "Failed to deregister gateway");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Parse the exporter address. Validation has already checked it.
fn metrics_address(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|_| {
        ConfigError::Validation(vec![ValidationError::MetricsAddress(raw.to_string())])
    })
}

/// Register the gateway when configured to. Returns the service id.
pub async fn register_self(
    config: &RegistryConfig,
    registry: &dyn ServiceRegistry,
) -> Result<Option<String>, RegistryError> {
    if !config.register_self {
        return Ok(None);
    }

    let id = registry
        .register(
            &config.service_name,
            &config.advertise_address,
            config.advertise_port,
            HEALTH_CHECK_PATH,
        )
        .await?;

    tracing::info!(
        service = %config.service_name,
        id = %id,
        port = config.advertise_port,
        "Gateway registered with service registry"
    );
    Ok(Some(id))
}

/// Compile `records` and swap them in. On failure the current table stays.
pub fn apply_routes(routes: &SharedRouteTable, records: &[RouteConfig]) -> bool {
    match RouteTable::from_records(records) {
        Ok(table) => {
            routes.replace(table);
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected reloaded routes. Keeping current route table.");
            false
        }
    }
}

/// Apply file-watch snapshots and SIGHUP reloads until shutdown.
fn spawn_reloader(
    routes: Arc<SharedRouteTable>,
    source: impl RouteSource + 'static,
    mut reload_rx: mpsc::UnboundedReceiver<()>,
    mut file_rx: Option<mpsc::UnboundedReceiver<Vec<RouteConfig>>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                Some(()) = reload_rx.recv() => match source.load_routes() {
                    Ok(records) => {
                        apply_routes(&routes, &records);
                    }
                    Err(e) => tracing::error!(
                        error = %e,
                        "Failed to reload routes. Keeping current route table."
                    ),
                },
                Some(records) = recv_snapshot(&mut file_rx) => {
                    apply_routes(&routes, &records);
                }
                else => break,
            }
        }
        tracing::debug!("Route reloader stopped");
    });
}

async fn recv_snapshot(
    rx: &mut Option<mpsc::UnboundedReceiver<Vec<RouteConfig>>>,
) -> Option<Vec<RouteConfig>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
