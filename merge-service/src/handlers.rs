//! POST /merge-pdf — multipart upload with a repeated `files` field.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::path::PathBuf;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation, ConvertError};

use crate::merge;
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

pub async fn merge_pdfs(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResponse>, ApiError> {
    tracing::info!("Received merge request");

    let mut uploads: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(StatusCode::BAD_REQUEST, &format!("Invalid multipart: {e}"))
    })? {
        if field.name().unwrap_or("") != "files" {
            continue;
        }
        let filename = field.file_name().unwrap_or("unknown").to_string();
        let data = field.bytes().await.map_err(|e| {
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to read file: {e}"),
            )
        })?;
        uploads.push((filename, data.to_vec()));
    }

    if uploads.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "No files provided"));
    }
    for (filename, _) in &uploads {
        if !validation::has_allowed_extension(filename, &["pdf"]) {
            return Err(reject(StatusCode::BAD_REQUEST, "Only PDF files are allowed"));
        }
    }

    let storage_cfg = &state.config.storage;
    let mut saved_paths: Vec<PathBuf> = Vec::with_capacity(uploads.len());
    for (filename, data) in &uploads {
        let path = storage::save_bytes(
            &storage_cfg.upload_dir,
            &storage::unique_upload_name(filename),
            data,
        )
        .await
        .map_err(|e| {
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error saving files: {e}"),
            )
        })?;
        saved_paths.push(path);
    }

    let output_name = storage::unique_name("pdf");
    let output_path = storage_cfg.output_dir.join(&output_name);

    let total = tokio::task::spawn_blocking({
        let output_path = output_path.clone();
        move || merge::merge_pdfs(&saved_paths, &output_path)
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("Merge failed: {}", e);
        let status = match &e {
            // A member that fails to parse is the client's problem
            ConvertError::Pdf(_) => StatusCode::BAD_REQUEST,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        reject(status, &e.to_string())
    })?;

    tracing::info!(pages = total, output = %output_name, "PDFs merged");

    Ok(Json(ConversionResponse::success(
        "Successfully merged PDF files!",
        download_link(&storage_cfg.public_base_url, &output_name),
    )))
}
