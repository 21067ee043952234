//! Runtime configuration for the PDF merge service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

const ENV_PREFIX: &str = "MERGE";
const DEFAULT_PORT: u16 = 8003;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env(ENV_PREFIX, DEFAULT_PORT)?,
            storage: StorageConfig::from_env(ENV_PREFIX, "uploaded", "merged", DEFAULT_PORT),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
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
