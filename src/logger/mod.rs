//! Logger module
//!
//! Provides logging utilities for the diagnosis server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error, warning, info and debug lines
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: Level, message: &str) {
    if let Some(w) = writer::get() {
        w.write(level, message);
    } else if level <= Level::Warn {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write(Level::Info, "======================================");
    write(Level::Info, "Scan diagnosis server started");
    write(Level::Info, &format!("Listening on: http://{addr}"));
    write(Level::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write(Level::Info, &format!("Worker threads: {workers}"));
    }
    write(
        Level::Info,
        &format!("Max upload size: {} bytes", config.http.max_body_size),
    );
    if config.routes.health.enabled {
        write(
            Level::Info,
            &format!("Health probe: GET {}", config.routes.health.path),
        );
    }
    if let Some(ref path) = config.logging.access_log_file {
        write(Level::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(Level::Info, &format!("Error log: {path}"));
    }
    write(Level::Info, "======================================\n");
}

pub fn log_shutdown(active_connections: usize) {
    write(
        Level::Info,
        &format!("[Shutdown] Listener closed, {active_connections} connection(s) still finishing"),
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write(Level::Info, &format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    write(Level::Debug, &format!("[DEBUG] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    if let Some(w) = writer::get() {
        w.write_access(&line);
    } else {
        println!("{line}");
    }
}
