// Signal handling module
//
// Supported signals:
// - SIGTERM: stop accepting and exit
// - SIGINT:  stop accepting and exit (Ctrl+C)
//
// In-flight connections are not awaited; the process exits once the accept
// loop returns.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start signal handlers (Unix)
///
/// Spawns a background task that notifies `shutdown` once on the first
/// SIGTERM or SIGINT.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                logger::log_warning(&format!("Failed to register SIGINT handler: {e}"));
                return;
            }
        };

        logger::log_debug(&format!(
            "[SIGNAL] Handlers registered for SIGTERM/SIGINT, pid {}",
            std::process::id()
        ));

        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        logger::log_info(&format!("[SIGNAL] {name} received, shutting down"));
        shutdown.notify_one();
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
            shutdown.notify_one();
        }
    });
}
