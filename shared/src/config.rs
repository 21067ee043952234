//! Environment-driven configuration building blocks.
//!
//! Each service composes its own `Config` from these pieces in its local
//! `config.rs`, with its own env prefix, default port, and folder names.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read `{PREFIX}_HOST` / `{PREFIX}_PORT`, falling back to the
    /// service's hardcoded defaults.
    pub fn from_env(prefix: &str, default_port: u16) -> Result<Self, ConfigError> {
        let host =
            env::var(format!("{prefix}_HOST")).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var(format!("{prefix}_PORT")) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => default_port,
        };
        Ok(Self { host, port })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

/// Local folders and the base URL advertised in download links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub public_base_url: String,
}

impl StorageConfig {
    pub fn from_env(
        prefix: &str,
        default_upload_dir: &str,
        default_output_dir: &str,
        default_port: u16,
    ) -> Self {
        let upload_dir = env::var(format!("{prefix}_UPLOAD_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(default_upload_dir));
        let output_dir = env::var(format!("{prefix}_OUTPUT_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(default_output_dir));
        let public_base_url = env::var(format!("{prefix}_PUBLIC_BASE_URL"))
            .unwrap_or_else(|_| format!("http://127.0.0.1:{default_port}"));
        Self {
            upload_dir,
            output_dir,
            public_base_url,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.as_os_str().is_empty() || self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "Upload and output directories must be set".to_string(),
            ));
        }
        if self.upload_dir == self.output_dir {
            return Err(ConfigError::Invalid(
                "Upload and output directories must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_env("FILEFORGE_TEST_NOPE", 8042).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8042);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_defaults() {
        let config = StorageConfig::from_env("FILEFORGE_TEST_NOPE", "uploads", "outputs", 8042);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_base_url, "http://127.0.0.1:8042");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_dirs_rejected() {
        let config = StorageConfig {
            upload_dir: PathBuf::from("files"),
            output_dir: PathBuf::from("files"),
            public_base_url: "http://127.0.0.1:8000".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
