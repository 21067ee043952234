//! POST /addpgno — multipart upload of one PDF, optional `position` and
//! `custom_text` form fields.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::path::Path;
use uuid::Uuid;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::stamp;
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

pub async fn add_page_numbers(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResponse>, ApiError> {
    tracing::info!("Received page-numbering request");

    let mut filename = String::new();
    let mut file_data: Option<Vec<u8>> = None;
    let mut position = "bottom".to_string();
    let mut custom_text: Option<String> = None;

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
            "position" => {
                position = field.text().await.unwrap_or_default();
            }
            "custom_text" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    custom_text = Some(text);
                }
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

    // Only bottom placement is implemented; the field is accepted for
    // interface compatibility.
    if position != "bottom" {
        tracing::warn!(position = %position, "Unsupported position requested, using bottom");
    }

    let file_id = Uuid::new_v4();
    let stem = Path::new(&filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let storage_cfg = &state.config.storage;
    let input_path = storage::save_bytes(
        &storage_cfg.upload_dir,
        &format!("{file_id}_{filename}"),
        &data,
    )
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let output_name = format!("{file_id}_{stem}_numbered.pdf");
    let output_path = storage_cfg.output_dir.join(&output_name);

    let custom = custom_text.clone();
    let total = tokio::task::spawn_blocking({
        let input_path = input_path.clone();
        let output_path = output_path.clone();
        move || stamp::add_page_numbers(&input_path, &output_path, custom.as_deref())
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("Failed to process PDF: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process the PDF")
    })?;

    tracing::info!(pages = total, output = %output_name, "Page numbers added");

    Ok(Json(ConversionResponse::success(
        "Page numbers added successfully",
        download_link(&storage_cfg.public_base_url, &output_name),
    )))
}
