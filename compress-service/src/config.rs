//! Runtime configuration for the PDF compression service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

use crate::compress::QualityLevel;

const ENV_PREFIX: &str = "COMPRESS";
const DEFAULT_PORT: u16 = 8002;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Quality applied when the request carries no `quality_level` field
    pub default_quality: QualityLevel,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_quality = std::env::var(format!("{ENV_PREFIX}_DEFAULT_QUALITY"))
            .map(|v| QualityLevel::from_form(&v))
            .unwrap_or(QualityLevel::Medium);
        Ok(Self {
            server: ServerConfig::from_env(ENV_PREFIX, DEFAULT_PORT)?,
            storage: StorageConfig::from_env(
                ENV_PREFIX,
                "uploaded_pdfs",
                "compressed_files",
                DEFAULT_PORT,
            ),
            default_quality,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
