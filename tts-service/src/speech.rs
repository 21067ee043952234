//! Language detection, chunking, and the upstream synthesis calls.
//!
//! The upstream endpoint caps each request around 200 characters, so the
//! input is split at sentence boundaries (falling back to words) and the
//! returned MP3 frames are concatenated. MP3 streams survive naive
//! concatenation, which keeps this simple.

use shared::ConvertError;
use whatlang::Lang;

/// Upstream per-request character limit
pub const MAX_CHUNK_CHARS: usize = 200;

/// Detect the text's language and return the ISO 639-1 code the upstream
/// endpoint expects. Unknown or unmapped languages fall back to English.
pub fn language_code(text: &str) -> &'static str {
    let Some(info) = whatlang::detect(text) else {
        return "en";
    };
    match info.lang() {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Hin => "hi",
        Lang::Ara => "ar",
        Lang::Nld => "nl",
        Lang::Tur => "tr",
        Lang::Pol => "pl",
        Lang::Ukr => "uk",
        Lang::Vie => "vi",
        Lang::Ind => "id",
        Lang::Ben => "bn",
        Lang::Urd => "ur",
        Lang::Tha => "th",
        Lang::Ell => "el",
        Lang::Heb => "he",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Ces => "cs",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        _ => "en",
    }
}

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// sentence boundaries, then word boundaries. A single word longer than
/// the limit is hard-split.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences(text) {
        if sentence.chars().count() > max_chars {
            // Flush, then break the oversized sentence on words
            push_chunk(&mut chunks, &mut current);
            for word in sentence.split_whitespace() {
                if word.chars().count() > max_chars {
                    push_chunk(&mut chunks, &mut current);
                    let mut piece = String::new();
                    for ch in word.chars() {
                        if piece.chars().count() == max_chars {
                            chunks.push(piece.clone());
                            piece.clear();
                        }
                        piece.push(ch);
                    }
                    current = piece;
                } else if current.chars().count() + word.chars().count() + 1 > max_chars {
                    push_chunk(&mut chunks, &mut current);
                    current.push_str(word);
                } else {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                }
            }
            push_chunk(&mut chunks, &mut current);
        } else if current.chars().count() + sentence.chars().count() + 1 > max_chars {
            push_chunk(&mut chunks, &mut current);
            current.push_str(&sentence);
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
        }
    }
    push_chunk(&mut chunks, &mut current);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | '\n') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    out
}

/// Fetch MP3 audio for `text` in `lang`, one upstream request per chunk,
/// and return the concatenated stream.
pub async fn synthesize(
    client: &reqwest::Client,
    base_url: &str,
    text: &str,
    lang: &str,
) -> Result<Vec<u8>, ConvertError> {
    let chunks = split_into_chunks(text, MAX_CHUNK_CHARS);
    if chunks.is_empty() {
        return Err(ConvertError::InvalidInput("No text to speak".to_string()));
    }

    let mut audio = Vec::new();
    for chunk in &chunks {
        let response = client
            .get(base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk.as_str()),
                ("tl", lang),
                ("client", "tw-ob"),
            ])
            .send()
            .await
            .map_err(|e| ConvertError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConvertError::Upstream(format!(
                "TTS endpoint returned {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConvertError::Upstream(e.to_string()))?;
        audio.extend_from_slice(&bytes);
    }

    tracing::debug!(chunks = chunks.len(), bytes = audio.len(), "Synthesis complete");
    Ok(audio)
}
