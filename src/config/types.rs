// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Keep-alive switch: 0 closes each connection after one response,
    /// any other value keeps it open. Idle connections are bounded by the
    /// read/write timeouts, not by this value.
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Upper bound for a buffered upload, in bytes
    pub max_body_size: u64,
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutesConfig {
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Answer liveness probes (off by default: every GET is a 405 otherwise)
    #[serde(default)]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_health_path")]
    pub path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_path() -> String {
    "/healthz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_health_path(),
        }
    }
}
