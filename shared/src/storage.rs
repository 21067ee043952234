//! Local-disk storage helpers.
//!
//! Every service keeps two folders: one for raw uploads, one for generated
//! outputs. Files are named by UUIDv4 so concurrent requests cannot collide;
//! nothing is ever cleaned up.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::ConvertError;

/// Create the upload/output folders if they do not exist yet.
pub fn ensure_dirs(dirs: &[&Path]) -> Result<(), ConvertError> {
    for dir in dirs {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// `"<uuid>.<ext>"`, or just `"<uuid>"` when `ext` is empty.
pub fn unique_name(ext: &str) -> String {
    let id = Uuid::new_v4();
    if ext.is_empty() {
        id.to_string()
    } else {
        format!("{id}.{ext}")
    }
}

/// `"<uuid>_<original>"` — keeps the uploaded name visible on disk.
pub fn unique_upload_name(original: &str) -> String {
    // Strip any client-supplied path components
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    format!("{}_{}", Uuid::new_v4(), base)
}

/// Write uploaded bytes to `dir/name` and return the full path.
pub async fn save_bytes(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf, ConvertError> {
    let path = dir.join(name);
    tokio::fs::write(&path, data).await?;
    Ok(path)
}

/// File size in KiB, rounded to two decimals.
pub fn file_size_kb(path: &Path) -> Result<f64, ConvertError> {
    let bytes = std::fs::metadata(path)?.len();
    Ok((bytes as f64 / 1024.0 * 100.0).round() / 100.0)
}
