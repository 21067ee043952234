//! Shared utilities and types for the FileForge conversion services

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;
pub use uuid;

pub mod config;
pub mod imaging;
pub mod observability;
pub mod office;
pub mod storage;
pub mod types;
pub mod validation;

pub use types::error::ConvertError;
pub use types::response::ConversionResponse;

pub type Result<T> = std::result::Result<T, ConvertError>;
