// Server loop module
// Accepts connections until a shutdown signal, then waits for in-flight work

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use super::connection::{accept_connection, connection_timeout};
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` resolves.
///
/// After the listener closes, open connections get up to one connection
/// timeout to finish before this returns.
pub async fn start_server_loop<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> std::io::Result<()>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));
    drain_connections(&state).await;
    Ok(())
}

async fn drain_connections(state: &AppState) {
    let deadline = tokio::time::Instant::now() + connection_timeout(state);
    while state.active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown deadline reached with {} connection(s) open",
                state.active_connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
