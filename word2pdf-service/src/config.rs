//! Runtime configuration for the Word-to-PDF service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

const ENV_PREFIX: &str = "WORD2PDF";
const DEFAULT_PORT: u16 = 8013;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// LibreOffice binary, resolved via PATH unless overridden
    pub soffice_path: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let soffice_path = std::env::var(format!("{ENV_PREFIX}_SOFFICE_PATH"))
            .unwrap_or_else(|_| "soffice".to_string());
        Ok(Self {
            server: ServerConfig::from_env(ENV_PREFIX, DEFAULT_PORT)?,
            storage: StorageConfig::from_env(
                ENV_PREFIX,
                "uploads_word",
                "converted_pdf",
                DEFAULT_PORT,
            ),
            soffice_path,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
        if self.soffice_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "soffice path must not be empty".to_string(),
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
