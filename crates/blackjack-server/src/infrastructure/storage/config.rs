//! TOML-based configuration for the dealer server.
//!
//! Reads `ServerConfig` from an explicit path or the platform config file:
//! - Windows:  `%APPDATA%\Pyjack\server.toml`
//! - Linux:    `~/.config/pyjack/server.toml`
//! - macOS:    `~/Library/Application Support/Pyjack/server.toml`
//!
//! Example:
//!
//! ```toml
//! [server]
//! name = "pyjack"
//! idle_timeout_secs = 60
//!
//! [network]
//! bind_address = "0.0.0.0"
//! tcp_port = 0
//! discovery_port = 13122
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section, or
//! a partial section all work.  Command-line flags override file values.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use blackjack_core::protocol::messages::{DEFAULT_SERVER_NAME, DISCOVERY_PORT, NAME_FIELD_LEN};
use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is unusable (zero timeout, bad IP, ...).
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub network: NetworkSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerSection {
    /// Advertised in every Offer; at most 32 bytes of UTF-8.
    #[serde(default = "default_name")]
    pub name: String,
    /// How long a session waits for the peer's next packet.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NetworkSection {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Session listener port; `0` lets the OS choose.
    #[serde(default)]
    pub tcp_port: u16,
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: String,
    #[serde(default = "default_offer_interval_ms")]
    pub offer_interval_ms: u64,
    #[serde(default = "default_true")]
    pub announce: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}
fn default_idle_timeout_secs() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_discovery_port() -> u16 {
    DISCOVERY_PORT
}
fn default_broadcast_address() -> String {
    "255.255.255.255".to_string()
}
fn default_offer_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            idle_timeout_secs: default_idle_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            tcp_port: 0,
            discovery_port: default_discovery_port(),
            broadcast_address: default_broadcast_address(),
            offer_interval_ms: default_offer_interval_ms(),
            announce: default_true(),
        }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl ServerConfig {
    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.len() > NAME_FIELD_LEN {
            return Err(ConfigError::Invalid(format!(
                "server name {:?} is longer than {NAME_FIELD_LEN} bytes",
                self.server.name
            )));
        }
        if self.server.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "idle_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.network.offer_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "offer_interval_ms must be greater than 0".to_string(),
            ));
        }
        self.bind_socket_addr()?;
        self.broadcast_target()?;
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.server.idle_timeout_secs)
    }

    pub fn offer_interval(&self) -> Duration {
        Duration::from_millis(self.network.offer_interval_ms)
    }

    /// Address for the session listener.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `bind_address` is not an IP.
    pub fn bind_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = parse_ip("bind_address", &self.network.bind_address)?;
        Ok(SocketAddr::new(ip, self.network.tcp_port))
    }

    /// Destination for Offer datagrams.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `broadcast_address` is not an IP.
    pub fn broadcast_target(&self) -> Result<SocketAddr, ConfigError> {
        let ip = parse_ip("broadcast_address", &self.network.broadcast_address)?;
        Ok(SocketAddr::new(ip, self.network.discovery_port))
    }
}

fn parse_ip(field: &str, value: &str) -> Result<IpAddr, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{field} {value:?} is not an IP address")))
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("server.toml"))
}

/// Loads the config from `path`, or from the platform file when `path` is
/// `None`.  A missing file yields [`ServerConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Pyjack"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("pyjack"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Pyjack")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("pyjack_test_{}", Uuid::new_v4()))
            .join("server.toml")
    }

    #[test]
    fn test_defaults_match_protocol_constants() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.name, "pyjack");
        assert_eq!(cfg.server.idle_timeout_secs, 60);
        assert_eq!(cfg.network.tcp_port, 0);
        assert_eq!(cfg.network.discovery_port, 13122);
        assert_eq!(cfg.network.offer_interval_ms, 1000);
        assert!(cfg.network.announce);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_partial_network_section_overrides_only_given_fields() {
        // Arrange
        let toml_str = r#"
            [network]
            tcp_port = 5555
            announce = false
        "#;

        // Act
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(cfg.network.tcp_port, 5555);
        assert!(!cfg.network.announce);
        assert_eq!(cfg.network.discovery_port, 13122);
        assert_eq!(cfg.server.name, "pyjack");
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[server\nname = ").unwrap();

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let cfg = load_config(Some(&temp_path())).unwrap();
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_load_reads_file_from_temp_dir() {
        // Arrange
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[server]\nname = \"table-7\"\n\n[network]\ntcp_port = 40100\n",
        )
        .unwrap();

        // Act
        let loaded = load_config(Some(&path)).unwrap();

        // Assert
        let mut expected = ServerConfig::default();
        expected.server.name = "table-7".to_string();
        expected.network.tcp_port = 40100;
        assert_eq!(loaded, expected);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_validate_rejects_zero_idle_timeout() {
        let mut cfg = ServerConfig::default();
        cfg.server.idle_timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let mut cfg = ServerConfig::default();
        cfg.server.name = "n".repeat(33);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_non_ip_bind_address() {
        let mut cfg = ServerConfig::default();
        cfg.network.bind_address = "localhost".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_derived_addresses() {
        let mut cfg = ServerConfig::default();
        cfg.network.bind_address = "127.0.0.1".to_string();
        cfg.network.tcp_port = 9000;

        assert_eq!(cfg.bind_socket_addr().unwrap(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(
            cfg.broadcast_target().unwrap(),
            "255.255.255.255:13122".parse().unwrap()
        );
        assert_eq!(cfg.idle_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.offer_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_config_file_path_ends_with_server_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("server.toml"));
        }
    }
}
