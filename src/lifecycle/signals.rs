//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGTERM, SIGINT (Ctrl-C) and SIGHUP
//! - Translate them into shutdown or route reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers a route reload, not shutdown
//! - Non-unix targets only get Ctrl-C

use tokio::sync::mpsc;

use crate::lifecycle::shutdown::Shutdown;

/// What a received signal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Shutdown,
    Reload,
}

/// Wait for the next signal of interest.
#[cfg(unix)]
pub async fn next_signal() -> std::io::Result<SignalAction> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| SignalAction::Shutdown),
        _ = terminate.recv() => Ok(SignalAction::Shutdown),
        _ = hangup.recv() => Ok(SignalAction::Reload),
    }
}

#[cfg(not(unix))]
pub async fn next_signal() -> std::io::Result<SignalAction> {
    tokio::signal::ctrl_c().await.map(|_| SignalAction::Shutdown)
}

/// Spawn the signal loop.
///
/// Reload requests go to `reload_tx`; the first shutdown signal triggers
/// `shutdown` and ends the loop.
pub fn spawn_signal_handler(shutdown: Shutdown, reload_tx: mpsc::UnboundedSender<()>) {
    tokio::spawn(async move {
        loop {
            match next_signal().await {
                Ok(SignalAction::Reload) => {
                    tracing::info!("SIGHUP received, reloading routes");
                    let _ = reload_tx.send(());
                }
                Ok(SignalAction::Shutdown) => {
                    tracing::info!("Termination signal received");
                    let _ = shutdown.trigger();
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handlers, shutting down");
                    let _ = shutdown.trigger();
                    break;
                }
            }
        }
    });
}
