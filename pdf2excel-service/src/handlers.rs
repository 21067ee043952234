//! POST /convert-pdf-to-excel — multipart upload of one PDF.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::extract;
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

pub async fn convert_pdf_to_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResponse>, ApiError> {
    tracing::info!("Received PDF-to-Excel request");

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

    let unique_id = Uuid::new_v4();
    let storage_cfg = &state.config.storage;
    let input_path = storage::save_bytes(
        &storage_cfg.upload_dir,
        &format!("{unique_id}.pdf"),
        &data,
    )
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let output_name = format!("{unique_id}.xlsx");
    let output_path = storage_cfg.output_dir.join(&output_name);

    let sheets = tokio::task::spawn_blocking({
        let input_path = input_path.clone();
        let output_path = output_path.clone();
        move || extract::pdf_to_excel(&input_path, &output_path)
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("PDF-to-Excel conversion failed: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
    })?;

    if sheets == 0 {
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No tables found in the PDF.",
        ));
    }

    tracing::info!(sheets, output = %output_name, "PDF converted to Excel");

    Ok(Json(ConversionResponse::success(
        "Successfully converted PDF to Excel!",
        download_link(&storage_cfg.public_base_url, &output_name),
    )))
}
