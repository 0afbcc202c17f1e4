//! Configuration file watcher for route table hot reload.

use std::path::Path;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{FileRouteSource, RouteSource};
use crate::config::schema::RouteConfig;

/// A watcher that monitors the configuration file for changes.
///
/// Each successful reload sends a complete, ordered snapshot of enabled
/// route records. Failed reloads are logged and nothing is sent, so the
/// current table stays in service.
pub struct ConfigWatcher {
    source: FileRouteSource,
    update_tx: mpsc::UnboundedSender<Vec<RouteConfig>>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for route snapshots.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<Vec<RouteConfig>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                source: FileRouteSource::new(path),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let source = self.source.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading routes");
                        match source.load_routes() {
                            Ok(routes) => {
                                let _ = tx.send(routes);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload routes. Keeping current route table."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(self.source.path(), RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.source.path(), "Config watcher started");
        Ok(watcher)
    }
}
