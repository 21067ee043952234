//! POST /text-to-speech — a `text` form field or an uploaded `.txt` file,
//! plus an optional `gender` field (`male` or `female`, default female).

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::types::response::{download_link, ConversionResponse};
use shared::{storage, validation};

use crate::{audio, speech, AppState};

type ApiError = (StatusCode, Json<ConversionResponse>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ConversionResponse::error(message)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gender {
    Male,
    Female,
}

impl Gender {
    fn from_form(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            _ => Gender::Female,
        }
    }
}

pub async fn text_to_speech(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResponse>, ApiError> {
    tracing::info!("Received text-to-speech request");

    let mut text: Option<String> = None;
    let mut uploaded_text: Option<String> = None;
    let mut gender = Gender::Female;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(StatusCode::BAD_REQUEST, &format!("Invalid multipart: {e}"))
    })? {
        match field.name().unwrap_or("") {
            "text" => {
                text = field.text().await.ok().filter(|t| !t.trim().is_empty());
            }
            "file" => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                if !validation::has_allowed_extension(&filename, &["txt"]) {
                    return Err(reject(StatusCode::BAD_REQUEST, "text and text files only"));
                }
                let data = field.bytes().await.map_err(|e| {
                    reject(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        &format!("Failed to read file: {e}"),
                    )
                })?;
                let contents = String::from_utf8_lossy(&data).into_owned();
                if !contents.trim().is_empty() {
                    uploaded_text = Some(contents);
                }
            }
            "gender" => {
                if let Ok(value) = field.text().await {
                    gender = Gender::from_form(&value);
                }
            }
            _ => {}
        }
    }

    // Inline text wins when both are supplied
    let Some(input_text) = text.or(uploaded_text) else {
        return Err(reject(StatusCode::BAD_REQUEST, "text and text files only"));
    };

    let unique_id = Uuid::new_v4();
    let storage_cfg = &state.config.storage;

    // Keep the source text around for troubleshooting
    storage::save_bytes(
        &storage_cfg.upload_dir,
        &format!("{unique_id}.txt"),
        input_text.as_bytes(),
    )
    .await
    .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    let lang = speech::language_code(&input_text);
    tracing::info!(lang, gender = ?gender, "Synthesizing speech");

    let mp3 = speech::synthesize(&state.http, &state.config.tts_base_url, &input_text, lang)
        .await
        .map_err(|e| {
            tracing::error!("Speech synthesis failed: {}", e);
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            reject(status, &e.to_string())
        })?;

    let output_name = format!("{unique_id}.mp3");
    let output_path = storage_cfg.output_dir.join(&output_name);

    match gender {
        Gender::Female => {
            tokio::fs::write(&output_path, &mp3)
                .await
                .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;
        }
        Gender::Male => {
            // Stage the neutral voice, then pitch it down with ffmpeg
            let staged = storage::save_bytes(
                &storage_cfg.upload_dir,
                &format!("{unique_id}_neutral.mp3"),
                &mp3,
            )
            .await
            .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

            audio::deepen_voice(
                &state.config.ffmpeg_path,
                &staged,
                &output_path,
                state.config.sample_rate,
            )
            .await
            .map_err(|e| {
                tracing::error!("Pitch shift failed: {}", e);
                reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            })?;
        }
    }

    tracing::info!(output = %output_name, "Speech generated");

    Ok(Json(ConversionResponse::success(
        "Successfully converted text to speech!",
        download_link(&storage_cfg.public_base_url, &output_name),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing_defaults_to_female() {
        assert_eq!(Gender::from_form("male"), Gender::Male);
        assert_eq!(Gender::from_form("MALE"), Gender::Male);
        assert_eq!(Gender::from_form("female"), Gender::Female);
        assert_eq!(Gender::from_form("robot"), Gender::Female);
        assert_eq!(Gender::from_form(""), Gender::Female);
    }
}
