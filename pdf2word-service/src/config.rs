//! Runtime configuration for the PDF-to-Word service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

const ENV_PREFIX: &str = "PDF2WORD";
const DEFAULT_PORT: u16 = 8010;

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
                "uploads_pdf",
                "converted_word",
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
