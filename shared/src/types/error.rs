//! Common error types for the FileForge services

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            ConvertError::InvalidInput(_) => 400,
            ConvertError::UnsupportedFormat(_) => 400,
            ConvertError::NotFound(_) => 404,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Internal(err.to_string())
    }
}

impl From<image::ImageError> for ConvertError {
    fn from(err: image::ImageError) -> Self {
        ConvertError::Image(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            ConvertError::InvalidInput("bad range".to_string()).http_status_code(),
            400
        );
        assert_eq!(
            ConvertError::UnsupportedFormat("pdf files only".to_string()).http_status_code(),
            400
        );
        assert_eq!(
            ConvertError::NotFound("missing".to_string()).http_status_code(),
            404
        );
        assert_eq!(
            ConvertError::Pdf("corrupt xref".to_string()).http_status_code(),
            500
        );
        assert_eq!(
            ConvertError::ExternalTool("soffice exited with 1".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_client_error_split() {
        assert!(ConvertError::UnsupportedFormat("images only".to_string()).is_client_error());
        assert!(!ConvertError::Internal("disk full".to_string()).is_client_error());
    }

    #[test]
    fn test_unsupported_format_message_is_verbatim() {
        // The validation message is sent to the client untouched
        let err = ConvertError::UnsupportedFormat("Only PDF files are allowed".to_string());
        assert_eq!(err.to_string(), "Only PDF files are allowed");
    }
}
