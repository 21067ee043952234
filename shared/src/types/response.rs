//! Uniform JSON payload returned by every conversion endpoint

use serde::{Deserialize, Serialize};

/// Body of both success and error responses:
/// `{"status": "...", "message": "...", "download_link": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
}

impl ConversionResponse {
    pub fn success(message: impl Into<String>, download_link: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            download_link: Some(download_link.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            download_link: None,
        }
    }
}

/// Build the public download URL for a generated file.
pub fn download_link(public_base_url: &str, filename: &str) -> String {
    format!("{}/files/{}", public_base_url.trim_end_matches('/'), filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_payload_shape() {
        let resp = ConversionResponse::success(
            "Successfully compressed PDF file!",
            "http://127.0.0.1:8002/files/abc.pdf",
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["download_link"], "http://127.0.0.1:8002/files/abc.pdf");
    }

    #[test]
    fn test_error_payload_omits_link() {
        let resp = ConversionResponse::error("Only PDF files are allowed");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("download_link").is_none());
    }

    #[test]
    fn test_download_link_normalizes_trailing_slash() {
        assert_eq!(
            download_link("http://127.0.0.1:8000/", "out.pdf"),
            "http://127.0.0.1:8000/files/out.pdf"
        );
        assert_eq!(
            download_link("http://127.0.0.1:8000", "out.pdf"),
            "http://127.0.0.1:8000/files/out.pdf"
        );
    }
}
