//! Gateway shutdown.
//!
//! One trigger stops the HTTP listener (in-flight requests drain first) and
//! the route reloader. Deregistration runs after the listener returns.

use tokio::sync::broadcast;

/// Stop event shared by the listener and the reloader.
#[derive(Debug, Clone)]
pub struct Shutdown {
    stop_tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self { stop_tx }
    }

    /// Receiver for a task that must stop with the gateway. Only triggers
    /// sent after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.stop_tx.subscribe()
    }

    /// Stop every subscribed task. Returns how many were told; zero means
    /// they had all exited already.
    pub fn trigger(&self) -> usize {
        match self.stop_tx.send(()) {
            Ok(tasks) => {
                tracing::info!(tasks, "Gateway shutdown triggered");
                tasks
            }
            Err(_) => 0,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
