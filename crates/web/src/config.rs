//! Server configuration.
//!
//! Every field has a default, so an empty JSON object is a valid configuration:
//!
//! ```
//! use backed_web::config::ServerConfig;
//!
//! let config = ServerConfig::from_json_str(r#"{ "address": "0.0.0.0:9000", "keep_alive": false }"#).unwrap();
//! assert_eq!(config.address, "0.0.0.0:9000");
//! assert!(!config.keep_alive);
//! assert_eq!(config.idle_timeout_ms, 30_000);
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use backed_http::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES, FrameLimits};
use backed_http::connection::ConnectionOptions;
use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config json: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid listen address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid log level {level:?}")]
    InvalidLogLevel { level: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// listen address, `host:port`
    pub address: String,
    /// directory served when no route matches
    pub root_directory: Option<PathBuf>,
    /// value of the `X-Api-Version` response header
    pub api_version: Option<String>,
    pub keep_alive: bool,
    pub idle_timeout_ms: u64,
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
            root_directory: None,
            api_version: None,
            keep_alive: true,
            idle_timeout_ms: 30_000,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&json)
    }

    /// Resolves [`address`](Self::address) to socket addresses.
    pub fn socket_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidAddress { address: self.address.clone(), reason };

        let addrs = self.address.to_socket_addrs().map_err(|e| invalid(e.to_string()))?.collect::<Vec<_>>();
        if addrs.is_empty() {
            return Err(invalid("resolved to no address".to_string()));
        }
        Ok(addrs)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        self.log_level.parse::<Level>().map_err(|_| ConfigError::InvalidLogLevel { level: self.log_level.clone() })
    }

    /// `None` when the timeout is configured as `0`.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_ms > 0).then(|| Duration::from_millis(self.idle_timeout_ms))
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            limits: FrameLimits { max_header_bytes: self.max_header_bytes, max_body_bytes: self.max_body_bytes },
            idle_timeout: self.idle_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn defaults() {
        let config = ServerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address, "127.0.0.1:8080");
        assert!(config.keep_alive);
        assert_eq!(config.max_header_bytes, 8192);
        assert_eq!(config.max_body_bytes, 8 * 1024 * 1024);
        assert_eq!(config.log_level().unwrap(), Level::INFO);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn full_config() {
        let config = ServerConfig::from_json_str(indoc! {r#"
        {
            "address": "127.0.0.1:0",
            "root_directory": "./public",
            "api_version": "1.0",
            "keep_alive": false,
            "idle_timeout_ms": 0,
            "max_header_bytes": 1024,
            "max_body_bytes": 2048,
            "log_level": "debug"
        }
        "#})
        .unwrap();

        assert_eq!(config.root_directory, Some(PathBuf::from("./public")));
        assert_eq!(config.api_version.as_deref(), Some("1.0"));
        assert_eq!(config.idle_timeout(), None);
        assert_eq!(config.log_level().unwrap(), Level::DEBUG);

        let options = config.connection_options();
        assert_eq!(options.limits, FrameLimits { max_header_bytes: 1024, max_body_bytes: 2048 });
        assert_eq!(config.socket_addrs().unwrap().len(), 1);
    }

    #[test]
    fn errors() {
        assert!(matches!(ServerConfig::from_json_str("{ \"keep_alive\": 3 }"), Err(ConfigError::Json { .. })));
        assert!(matches!(ServerConfig::from_file("/definitely/not/here.json"), Err(ConfigError::Io { .. })));

        let config = ServerConfig { address: "not an address".into(), log_level: "loud".into(), ..Default::default() };
        assert!(matches!(config.socket_addrs(), Err(ConfigError::InvalidAddress { .. })));
        assert!(matches!(config.log_level(), Err(ConfigError::InvalidLogLevel { .. })));
    }
}
