// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Currently open connections
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}
