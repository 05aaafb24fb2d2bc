//! Server configuration.
//!
//! All fields have defaults matching the reference deployment (port 9999,
//! 64 workers, a 4096-byte header read limit, static files under `./public`).
//! A config can also be loaded from a JSON file; absent fields fall back to
//! the defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable server settings.
///
/// # Examples
///
/// ```
/// use servlite::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.port, 9999);
/// assert_eq!(config.workers, 64);
/// assert_eq!(config.read_limit, 4096);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port the listener binds to.
    pub port: u16,

    /// Fixed worker-pool capacity: the number of connections handled
    /// concurrently. Further accepted connections queue until a worker frees.
    pub workers: usize,

    /// Maximum combined size in bytes of the request line plus headers.
    /// Requests whose header phase exceeds this are rejected with 400.
    pub read_limit: usize,

    /// Directory the static-file whitelist resolves under.
    pub static_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9999,
            workers: 64,
            read_limit: 4096,
            static_root: "public".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a JSON file, defaulting any absent field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The socket address to bind: all interfaces on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}
