//! Runtime configuration for the white-background service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

const ENV_PREFIX: &str = "BGWHITE";
const DEFAULT_PORT: u16 = 8007;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Color distance below which a border-connected pixel counts as
    /// background
    pub tolerance: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let tolerance = std::env::var(format!("{ENV_PREFIX}_TOLERANCE"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(shared::imaging::DEFAULT_TOLERANCE);
        Ok(Self {
            server: ServerConfig::from_env(ENV_PREFIX, DEFAULT_PORT)?,
            storage: StorageConfig::from_env(
                ENV_PREFIX,
                "uploaded_images",
                "whitebg_added-images",
                DEFAULT_PORT,
            ),
            tolerance,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
        if !(0.0..=442.0).contains(&self.tolerance) {
            return Err(ConfigError::Invalid(
                "Tolerance must be between 0 and 442".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.validate().is_ok());
    }
}
