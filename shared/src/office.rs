//! Headless LibreOffice runner.
//!
//! The Office-format services (PDF→DOCX, PDF→PPTX, DOC/DOCX→PDF) all shell
//! out to `soffice --headless --convert-to <ext>`, which writes the result
//! next to `--outdir` under the input's file stem.

use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::ConvertError;

/// Convert `input` into `target_ext` format inside `out_dir` and return the
/// path of the produced file.
pub async fn convert(
    binary: &str,
    input: &Path,
    out_dir: &Path,
    target_ext: &str,
) -> Result<PathBuf, ConvertError> {
    let output = Command::new(binary)
        .arg("--headless")
        .arg("--convert-to")
        .arg(target_ext)
        .arg("--outdir")
        .arg(out_dir)
        .arg(input)
        .output()
        .await
        .map_err(|e| {
            ConvertError::ExternalTool(format!(
                "Failed to launch {binary}: {e}. Please make sure LibreOffice is installed."
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::ExternalTool(format!(
            "{binary} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let produced = expected_output(input, out_dir, target_ext)?;
    if !produced.exists() {
        return Err(ConvertError::ExternalTool(format!(
            "Conversion failed — output file not found: {}",
            produced.display()
        )));
    }

    tracing::info!(input = %input.display(), output = %produced.display(), "LibreOffice conversion complete");
    Ok(produced)
}

/// LibreOffice names the output `<stem>.<target_ext>` inside the outdir.
pub fn expected_output(
    input: &Path,
    out_dir: &Path,
    target_ext: &str,
) -> Result<PathBuf, ConvertError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| ConvertError::InvalidInput("Input file has no name".to_string()))?;
    Ok(out_dir.join(stem).with_extension(target_ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_output_path() {
        let out = expected_output(
            Path::new("uploads/abc123.pdf"),
            Path::new("converted"),
            "docx",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("converted/abc123.docx"));
    }

    #[test]
    fn test_expected_output_replaces_extension() {
        let out = expected_output(
            Path::new("uploads/report.docx"),
            Path::new("out"),
            "pdf",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("out/report.pdf"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let err = convert("soffice-definitely-not-installed", &input, dir.path(), "docx")
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 500);
        assert!(err.to_string().contains("LibreOffice"));
    }
}
