//! POST /white-background — multipart upload of one image.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::convert;
use crate::AppState;

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

pub async fn white_background(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResponse>, ApiError> {
    tracing::info!("Received white-background request");

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
    if !validation::has_allowed_extension(&filename, convert::ALLOWED_EXTENSIONS) {
        return Err(reject(StatusCode::BAD_REQUEST, "images only"));
    }

    let unique_id = Uuid::new_v4();
    let ext = validation::extension(&filename).unwrap_or_default();
    let storage_cfg = &state.config.storage;
    let input_path = storage::save_bytes(
        &storage_cfg.upload_dir,
        &format!("{unique_id}.{ext}"),
        &data,
    )
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    // Flattened output has no alpha, JPEG is fine
    let output_name = format!("{unique_id}.jpg");
    let output_path = storage_cfg.output_dir.join(&output_name);

    let tolerance = state.config.tolerance;
    tokio::task::spawn_blocking({
        let input_path = input_path.clone();
        let output_path = output_path.clone();
        move || convert::whiten_background_file(&input_path, &output_path, tolerance)
    })
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task failed: {e}")))?
    .map_err(|e| {
        tracing::error!("White background failed: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
    })?;

    tracing::info!(output = %output_name, "Background replaced with white");

    Ok(Json(ConversionResponse::success(
        "successfully added white bg!",
        download_link(&storage_cfg.public_base_url, &output_name),
    )))
}
