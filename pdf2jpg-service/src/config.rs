//! Runtime configuration for the PDF-to-JPG service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

const ENV_PREFIX: &str = "PDF2JPG";
const DEFAULT_PORT: u16 = 8009;
const DEFAULT_DPI: u32 = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Rasterization resolution in dots per inch
    pub dpi: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let dpi = std::env::var(format!("{ENV_PREFIX}_DPI"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DPI);
        Ok(Self {
            server: ServerConfig::from_env(ENV_PREFIX, DEFAULT_PORT)?,
            storage: StorageConfig::from_env(
                ENV_PREFIX,
                "uploaded_pdfs",
                "converted_images",
                DEFAULT_PORT,
            ),
            dpi,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
        if !(36..=600).contains(&self.dpi) {
            return Err(ConfigError::Invalid(
                "DPI must be between 36 and 600".to_string(),
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
        assert_eq!(config.dpi, DEFAULT_DPI);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extreme_dpi_rejected() {
        let mut config = Config::from_env().unwrap();
        config.dpi = 10_000;
        assert!(config.validate().is_err());
    }
}
