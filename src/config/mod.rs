// Configuration module entry point
// Loads layered configuration and exposes the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HealthConfig};

/// Default config file name, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Builder pre-populated with every default value
    fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "scan-diagnosis/0.1")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("routes.health.enabled", false)?
            .set_default("routes.health.path", "/healthz")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
impl Config {
    /// Defaults only, without touching the filesystem or environment
    pub fn for_tests() -> Self {
        Self::builder()
            .and_then(|builder| builder.build())
            .and_then(|settings| settings.try_deserialize())
            .expect("default configuration must deserialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::for_tests();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(!cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.path, "/healthz");
        assert!(cfg.server.workers.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::for_tests();
        assert_eq!(
            cfg.get_socket_addr().expect("valid address"),
            "127.0.0.1:8080".parse::<SocketAddr>().expect("literal")
        );
    }

    #[test]
    fn test_invalid_socket_addr() {
        let mut cfg = Config::for_tests();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
