//! POST /convert-pdf-to-jpg — multipart upload of one PDF.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::render;
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

/// Success payload with both the zip of all pages and a direct link to
/// the first page.
#[derive(Debug, Serialize)]
pub struct Pdf2JpgResponse {
    pub status: String,
    pub message: String,
    pub download_link: String,
    pub first_page_link: String,
}

pub async fn convert_pdf_to_jpg(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Pdf2JpgResponse>, ApiError> {
    tracing::info!("Received PDF-to-JPG request");

    let mut filename = String::new();
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(StatusCode::BAD_REQUEST, &format!("Invalid multipart: {e}"))
    })? {
        if field.name().unwrap_or("") == "file" {
            filename = field.file_name().unwrap_or("unknown").to_string();
            let data = field.bytes().await.map_err(|e| {
                reject(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to read file: {e}"),
                )
            })?;
            file_data = Some(data.to_vec());
        }
    }

    let data = file_data
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "No file provided"))?;
    if !validation::has_allowed_extension(&filename, &["pdf"]) {
        return Err(reject(StatusCode::BAD_REQUEST, "pdf files only"));
    }

    let request_id = Uuid::new_v4().to_string();
    let storage_cfg = &state.config.storage;
    let input_path = storage::save_bytes(
        &storage_cfg.upload_dir,
        &format!("{request_id}.pdf"),
        &data,
    )
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let dpi = state.config.dpi;
    let rendered = tokio::task::spawn_blocking({
        let input_path = input_path.clone();
        let output_dir = storage_cfg.output_dir.clone();
        let request_id = request_id.clone();
        move || render::pdf_to_jpgs(&input_path, &output_dir, &request_id, dpi)
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("PDF rasterization failed: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
    })?;

    tracing::info!(
        pages = rendered.page_count,
        zip = %rendered.zip_name,
        "PDF converted to JPG"
    );

    Ok(Json(Pdf2JpgResponse {
        status: "success".to_string(),
        message: format!("Successfully converted {} pages to JPG!", rendered.page_count),
        download_link: download_link(&storage_cfg.public_base_url, &rendered.zip_name),
        first_page_link: download_link(&storage_cfg.public_base_url, &rendered.first_page_name),
    }))
}
