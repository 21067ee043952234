//! Observability helpers shared by all services

pub mod logging;

#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type ObservabilityResult<T> = std::result::Result<T, ObservabilityError>;
