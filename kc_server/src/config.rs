//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration. CLI flags override the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Directory served at the web root (the client bundle)
    pub public_dir: PathBuf,
    /// Per-connection outbound notification queue depth
    pub ws_queue_depth: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables, applying CLI
    /// overrides where given.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        public_dir_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:8080"
                    .parse()
                    .expect("Default bind address is valid")
            });

        let public_dir = public_dir_override
            .or_else(|| std::env::var("PUBLIC_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("public"));

        let ws_queue_depth = parse_env_or("WS_QUEUE_DEPTH", 32);

        Ok(ServerConfig {
            bind,
            public_dir,
            ws_queue_depth,
        })
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ws_queue_depth == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_QUEUE_DEPTH".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.public_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                var: "PUBLIC_DIR".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
