//! Rasterize each PDF page to JPEG and bundle the pages into a zip.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;
use shared::ConvertError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Names of the artifacts produced for one conversion request.
pub struct RenderedPages {
    pub zip_name: String,
    pub first_page_name: String,
    pub page_count: usize,
}

/// Render every page of `input` at `dpi` into
/// `output_dir/<request_id>/page_<n>.jpg`, pack the pages into
/// `output_dir/<request_id>.zip`, and copy page 1 to
/// `output_dir/<request_id>.jpg` for quick previewing.
pub fn pdf_to_jpgs(
    input: &Path,
    output_dir: &Path,
    request_id: &str,
    dpi: u32,
) -> Result<RenderedPages, ConvertError> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library()
            .map_err(|e| ConvertError::ExternalTool(format!("pdfium unavailable: {e}")))?,
    );
    let document = pdfium
        .load_pdf_from_file(input, None)
        .map_err(|e| ConvertError::Pdf(e.to_string()))?;

    let page_count = document.pages().len() as usize;
    if page_count == 0 {
        return Err(ConvertError::Pdf("PDF has no pages".to_string()));
    }

    let pages_dir = output_dir.join(request_id);
    std::fs::create_dir_all(&pages_dir)?;

    let mut page_paths = Vec::with_capacity(page_count);
    for (index, page) in document.pages().iter().enumerate() {
        // Points are 1/72 inch, so scale the page width to the target DPI
        let target_width = (page.width().value * dpi as f32 / 72.0).round() as i32;
        let render_config = PdfRenderConfig::new().set_target_width(target_width.max(1));
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ConvertError::Pdf(format!("page {} render: {e}", index + 1)))?;
        let page_path = pages_dir.join(format!("page_{}.jpg", index + 1));
        bitmap.as_image().to_rgb8().save(&page_path)?;
        page_paths.push(page_path);
    }

    let zip_name = format!("{request_id}.zip");
    zip_pages(&page_paths, &output_dir.join(&zip_name))?;

    let first_page_name = format!("{request_id}.jpg");
    std::fs::copy(&page_paths[0], output_dir.join(&first_page_name))?;

    Ok(RenderedPages {
        zip_name,
        first_page_name,
        page_count,
    })
}

fn zip_pages(pages: &[PathBuf], zip_path: &Path) -> Result<(), ConvertError> {
    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for page in pages {
        let name = page
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ConvertError::Internal("non-UTF8 page filename".to_string()))?;
        writer
            .start_file(name, options)
            .map_err(|e| ConvertError::Internal(e.to_string()))?;
        writer.write_all(&std::fs::read(page)?)?;
    }
    writer
        .finish()
        .map_err(|e| ConvertError::Internal(e.to_string()))?;
    Ok(())
}
