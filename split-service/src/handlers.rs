//! POST /split-pdf — multipart upload of one PDF plus `start_page` and
//! `end_page` form fields.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::split;
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

pub async fn split_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResponse>, ApiError> {
    tracing::info!("Received split request");

    let mut filename = String::new();
    let mut file_data: Option<Vec<u8>> = None;
    let mut start_page: Option<u32> = None;
    let mut end_page: Option<u32> = None;

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
            "start_page" => {
                start_page = field.text().await.ok().and_then(|v| v.trim().parse().ok());
            }
            "end_page" => {
                end_page = field.text().await.ok().and_then(|v| v.trim().parse().ok());
            }
            _ => {}
        }
    }

    let data = file_data
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "No file provided"))?;
    if !validation::has_allowed_extension(&filename, &["pdf"]) {
        return Err(reject(StatusCode::BAD_REQUEST, "Only PDF files are allowed"));
    }
    let start = start_page
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "start_page is required"))?;
    let end =
        end_page.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "end_page is required"))?;

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

    let kept = tokio::task::spawn_blocking({
        let input_path = input_path.clone();
        let output_path = output_path.clone();
        move || split::split_pdf(&input_path, &output_path, start, end)
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("Split failed: {}", e);
        let status = if e.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        reject(status, &e.to_string())
    })?;

    tracing::info!(pages = kept, output = %output_name, "PDF split");

    Ok(Json(ConversionResponse::success(
        "Successfully split PDF file!",
        download_link(&storage_cfg.public_base_url, &output_name),
    )))
}
