//! POST /compress-pdf — multipart upload of one PDF plus an optional
//! `quality_level` form field.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::compress::{self, CompressionStats, QualityLevel};
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

#[derive(Debug, Serialize)]
pub struct CompressResponse {
    pub status: String,
    pub message: String,
    pub download_link: String,
    pub compression_stats: CompressionStats,
}

pub async fn compress_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CompressResponse>, ApiError> {
    tracing::info!("Received compression request");

    let mut filename = String::new();
    let mut file_data: Option<Vec<u8>> = None;
    let mut quality = state.config.default_quality;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(StatusCode::BAD_REQUEST, &format!("Invalid multipart: {e}"))
    })? {
        match field.name().unwrap_or("") {
            "file" => {
                filename = field.file_name().unwrap_or("unknown").to_string();
                let data = field.bytes().await.map_err(|e| {
                    reject(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        &format!("Failed to read file: {e}"),
                    )
                })?;
                file_data = Some(data.to_vec());
            }
            "quality_level" => {
                quality = QualityLevel::from_form(&field.text().await.unwrap_or_default());
            }
            _ => {}
        }
    }

    let data = file_data
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "No file provided"))?;
    if !validation::has_allowed_extension(&filename, &["pdf"]) {
        return Err(reject(StatusCode::BAD_REQUEST, "Only PDF files are allowed"));
    }
    if data.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Empty file provided"));
    }

    let storage_cfg = &state.config.storage;
    let input_path = storage::save_bytes(
        &storage_cfg.upload_dir,
        &storage::unique_name("pdf"),
        &data,
    )
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let output_name = storage::unique_name("pdf");
    let output_path = storage_cfg.output_dir.join(&output_name);

    let stats = tokio::task::spawn_blocking({
        let input_path = input_path.clone();
        let output_path = output_path.clone();
        move || compress::compress_pdf(&input_path, &output_path, quality)
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("Compression failed: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
    })?;

    tracing::info!(
        original_kb = stats.original_size,
        compressed_kb = stats.compressed_size,
        "PDF compressed"
    );

    Ok(Json(CompressResponse {
        status: "success".to_string(),
        message: "Successfully compressed PDF file!".to_string(),
        download_link: download_link(&storage_cfg.public_base_url, &output_name),
        compression_stats: stats,
    }))
}
