//! ffmpeg-based pitch shift for the male voice.

use std::path::Path;
use tokio::process::Command;

use shared::ConvertError;

/// Playback-rate factor for the deeper voice, about two semitones down
const PITCH_FACTOR: f64 = 0.8706;

/// Re-encode `input` with a lowered pitch into `output`.
///
/// `asetrate` slows the stream down (dropping the pitch with it) and
/// `aresample` restores the original sample rate so duration metadata
/// stays sane.
pub async fn deepen_voice(
    ffmpeg: &str,
    input: &Path,
    output: &Path,
    sample_rate: u32,
) -> Result<(), ConvertError> {
    let shifted_rate = (sample_rate as f64 * PITCH_FACTOR).round() as u32;
    let filter = format!("asetrate={shifted_rate},aresample={sample_rate}");

    let result = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-af")
        .arg(&filter)
        .arg(output)
        .output()
        .await
        .map_err(|e| {
            ConvertError::ExternalTool(format!(
                "Failed to launch {ffmpeg}: {e}. Please make sure ffmpeg is installed."
            ))
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(ConvertError::Audio(format!(
            "{ffmpeg} exited with {}: {}",
            result.status,
            stderr.trim()
        )));
    }
    if !output.exists() {
        return Err(ConvertError::Audio(
            "Pitch shift produced no output file".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_ffmpeg_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp3");
        std::fs::write(&input, b"fake mp3").unwrap();

        let err = deepen_voice(
            "ffmpeg-definitely-not-installed",
            &input,
            &dir.path().join("out.mp3"),
            24_000,
        )
        .await
        .unwrap_err();
        assert_eq!(err.http_status_code(), 500);
        assert!(err.to_string().contains("ffmpeg"));
    }
}
