//! Pull text out of a PDF page by page and lay it out as worksheets.
//!
//! Whitespace-aligned text is the only table signal a text layer gives us,
//! so a run of two or more spaces inside a line marks a column boundary.

use std::path::Path;

use pdfium_render::prelude::*;
use rust_xlsxwriter::Workbook;
use shared::ConvertError;

/// Convert `input` into an XLSX workbook at `output`, one `Sheet_<n>`
/// worksheet per page that carries text. Returns the number of sheets
/// written; `0` means no page had any text and no file was created.
pub fn pdf_to_excel(input: &Path, output: &Path) -> Result<usize, ConvertError> {
    let page_texts = extract_page_texts(input)?;
    write_workbook(&page_texts, output)
}

fn extract_page_texts(input: &Path) -> Result<Vec<String>, ConvertError> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library()
            .map_err(|e| ConvertError::ExternalTool(format!("pdfium unavailable: {e}")))?,
    );
    let document = pdfium
        .load_pdf_from_file(input, None)
        .map_err(|e| ConvertError::Pdf(e.to_string()))?;

    let mut texts = Vec::new();
    for page in document.pages().iter() {
        let text = page
            .text()
            .map_err(|e| ConvertError::Pdf(e.to_string()))?
            .all();
        texts.push(text);
    }
    Ok(texts)
}

/// Split a line into cells on runs of two or more spaces.
pub fn split_columns(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut space_run = 0usize;

    for ch in line.chars() {
        if ch == ' ' {
            space_run += 1;
        } else {
            if space_run >= 2 && !current.is_empty() {
                cells.push(current.trim().to_string());
                current.clear();
            } else if space_run > 0 && !current.is_empty() {
                current.push(' ');
            }
            space_run = 0;
            current.push(ch);
        }
    }
    if !current.is_empty() {
        cells.push(current.trim().to_string());
    }
    cells
}

fn write_workbook(page_texts: &[String], output: &Path) -> Result<usize, ConvertError> {
    let mut workbook = Workbook::new();
    let mut sheets = 0usize;

    for (index, text) in page_texts.iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(format!("Sheet_{}", index + 1))
            .map_err(|e| ConvertError::Internal(e.to_string()))?;

        let mut row = 0u32;
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            for (col, cell) in split_columns(line).into_iter().enumerate() {
                worksheet
                    .write_string(row, col as u16, &cell)
                    .map_err(|e| ConvertError::Internal(e.to_string()))?;
            }
            row += 1;
        }
        sheets += 1;
    }

    if sheets == 0 {
        return Ok(0);
    }

    workbook
        .save(output)
        .map_err(|e| ConvertError::Internal(e.to_string()))?;
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_on_double_space() {
        assert_eq!(
            split_columns("Item  Quantity  Unit Price"),
            vec!["Item", "Quantity", "Unit Price"]
        );
    }

    #[test]
    fn test_single_spaces_stay_in_one_cell() {
        assert_eq!(
            split_columns("Grand total of everything"),
            vec!["Grand total of everything"]
        );
    }

    #[test]
    fn test_wide_gaps_and_leading_spaces() {
        assert_eq!(
            split_columns("   Apples     12      0.50"),
            vec!["Apples", "12", "0.50"]
        );
    }

    #[test]
    fn test_empty_line_yields_no_cells() {
        assert!(split_columns("").is_empty());
        assert!(split_columns("     ").is_empty());
    }

    #[test]
    fn test_workbook_one_sheet_per_text_page() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let pages = vec![
            "Name  Age\nAlice  30\nBob  25".to_string(),
            String::new(),
            "Total  55".to_string(),
        ];

        let sheets = write_workbook(&pages, &output).unwrap();
        assert_eq!(sheets, 2);
        assert!(output.exists());
    }

    #[test]
    fn test_textless_pages_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let pages = vec![String::new(), "   \n  ".to_string()];

        let sheets = write_workbook(&pages, &output).unwrap();
        assert_eq!(sheets, 0);
        assert!(!output.exists());
    }
}
