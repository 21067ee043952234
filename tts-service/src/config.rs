//! Runtime configuration for the text-to-speech service

use serde::{Deserialize, Serialize};
use shared::config::{ConfigError, ServerConfig, StorageConfig};

const ENV_PREFIX: &str = "TTS";
const DEFAULT_PORT: u16 = 8014;
const DEFAULT_SAMPLE_RATE: u32 = 24_000;
const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Upstream synthesis endpoint
    pub tts_base_url: String,
    /// ffmpeg binary, resolved via PATH unless overridden
    pub ffmpeg_path: String,
    /// Sample rate used by the pitch filter
    pub sample_rate: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let tts_base_url = std::env::var(format!("{ENV_PREFIX}_BASE_URL"))
            .unwrap_or_else(|_| DEFAULT_TTS_URL.to_string());
        let ffmpeg_path = std::env::var(format!("{ENV_PREFIX}_FFMPEG_PATH"))
            .unwrap_or_else(|_| "ffmpeg".to_string());
        let sample_rate = std::env::var(format!("{ENV_PREFIX}_SAMPLE_RATE"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SAMPLE_RATE);
        Ok(Self {
            server: ServerConfig::from_env(ENV_PREFIX, DEFAULT_PORT)?,
            storage: StorageConfig::from_env(
                ENV_PREFIX,
                "uploaded_texts",
                "generated_audio",
                DEFAULT_PORT,
            ),
            tts_base_url,
            ffmpeg_path,
            sample_rate,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.storage.validate()?;
        if !self.tts_base_url.starts_with("http") {
            return Err(ConfigError::Invalid(
                "TTS base URL must be an http(s) URL".to_string(),
            ));
        }
        if !(8_000..=48_000).contains(&self.sample_rate) {
            return Err(ConfigError::Invalid(
                "Sample rate must be between 8000 and 48000".to_string(),
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
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_sample_rate_rejected() {
        let mut config = Config::from_env().unwrap();
        config.sample_rate = 100;
        assert!(config.validate().is_err());
    }
}
