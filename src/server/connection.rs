// Connection handling module
// Accepts a TCP connection and serves it with the diagnosis handler

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing `performance.max_connections`.
///
/// Returns `false` when the connection was rejected.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) -> bool {
    let counter = &state.active_connections;

    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = counter.fetch_add(1, Ordering::SeqCst);
    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return false;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
    true
}

/// Connection-wide deadline: the larger of the read and write timeouts
pub fn connection_timeout(state: &AppState) -> Duration {
    let perf = &state.config.performance;
    Duration::from_secs(std::cmp::max(perf.read_timeout, perf.write_timeout))
}

/// `performance.keep_alive_timeout` acts as an on/off switch
pub fn keep_alive_enabled(state: &AppState) -> bool {
    state.config.performance.keep_alive_timeout > 0
}

/// Serve one connection on its own task; the counter is released on exit.
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = connection_timeout(&state);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive_enabled(&state));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        release(&state.active_connections);
    });
}

fn release(counter: &AtomicUsize) {
    counter.fetch_sub(1, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_connection_timeout_uses_larger_value() {
        let mut config = Config::for_tests();
        config.performance.read_timeout = 5;
        config.performance.write_timeout = 12;
        let state = AppState::new(&config);
        assert_eq!(connection_timeout(&state), Duration::from_secs(12));
    }

    #[test]
    fn test_keep_alive_switch() {
        let mut config = Config::for_tests();
        assert!(keep_alive_enabled(&AppState::new(&config)));
        config.performance.keep_alive_timeout = 0;
        assert!(!keep_alive_enabled(&AppState::new(&config)));
    }

    #[tokio::test]
    async fn test_rejects_over_connection_limit() {
        let mut config = Config::for_tests();
        config.performance.max_connections = Some(1);
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(&config));
        // One slot already taken
        state.active_connections.store(1, Ordering::SeqCst);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let client = TcpStream::connect(addr);
        let (accepted, _) = tokio::join!(listener.accept(), client);
        let (stream, peer) = accepted.expect("accept");

        assert!(!accept_connection(stream, peer, &state));
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 1);
    }
}
