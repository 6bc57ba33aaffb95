//! Configuration schema (schemaport.toml)

use serde::{Deserialize, Serialize};

/// Default connect timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default read timeout in seconds
const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// SFTP connection configuration
///
/// Credentials are carried explicitly here and passed to the fetcher
/// constructor. Environment variables are only consulted at the CLI edge,
/// never inside the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftpConfig {
    /// Username for password authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for password authentication
    #[serde(default)]
    pub password: Option<String>,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_read_timeout() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

impl Default for SftpConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SFTP connection settings
    #[serde(default)]
    pub sftp: SftpConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.sftp.username.is_none());
        assert_eq!(config.sftp.connect_timeout_secs, 30);
        assert_eq!(config.sftp.read_timeout_secs, 60);
    }

    #[test]
    fn parse_sftp_section() {
        let config = Config::from_toml(
            r#"
            [sftp]
            username = "demo"
            password = "demo"
            connect_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.sftp.username.as_deref(), Some("demo"));
        assert_eq!(config.sftp.connect_timeout_secs, 5);
        // Unset fields keep their defaults
        assert_eq!(config.sftp.read_timeout_secs, 60);
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = Config::default();
        config.sftp.username = Some("demo".to_string());

        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.sftp, parsed.sftp);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = Config::from_toml("[sftp\nusername = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/schemaport.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
