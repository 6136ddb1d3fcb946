// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolve once a shutdown signal arrives (Unix)
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            logger::log_error(&format!("Failed to register signal handlers: {e}"));
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => logger::log_info("SIGTERM received, shutting down"),
        _ = sigint.recv() => logger::log_info("SIGINT received, shutting down"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_info("Ctrl+C received, shutting down"),
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
