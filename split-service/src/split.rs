//! Extracts an inclusive 1-based page range into a new PDF.

use lopdf::Document;
use std::path::Path;

use shared::ConvertError;

fn pdf_err(e: lopdf::Error) -> ConvertError {
    ConvertError::Pdf(e.to_string())
}

/// Keep pages `start..=end` of `input` and write the result to `output`.
/// Returns the number of pages kept.
pub fn split_pdf(
    input: &Path,
    output: &Path,
    start_page: u32,
    end_page: u32,
) -> Result<u32, ConvertError> {
    let mut doc = Document::load(input).map_err(pdf_err)?;
    let total = doc.get_pages().len() as u32;

    if start_page < 1 || end_page > total || start_page > end_page {
        return Err(ConvertError::InvalidInput(format!(
            "Invalid page range. The PDF has {total} pages."
        )));
    }

    let to_delete: Vec<u32> = (1..=total)
        .filter(|page| *page < start_page || *page > end_page)
        .collect();
    if !to_delete.is_empty() {
        doc.delete_pages(&to_delete);
    }

    doc.prune_objects();
    doc.save(output).map_err(|e| pdf_err(e.into()))?;
    Ok(end_page - start_page + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn sample_pdf(path: &Path, page_count: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for i in 0..page_count {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("page {}", i + 1))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_split_keeps_requested_range() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(&input, 5);

        let kept = split_pdf(&input, &output, 2, 4).unwrap();
        assert_eq!(kept, 3);

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_full_range_is_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(&input, 3);

        assert_eq!(split_pdf(&input, &output, 1, 3).unwrap(), 3);
        assert_eq!(Document::load(&output).unwrap().get_pages().len(), 3);
    }

    #[test]
    fn test_invalid_ranges_report_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(&input, 3);

        for (start, end) in [(0, 2), (2, 5), (3, 2)] {
            let err = split_pdf(&input, &output, start, end).unwrap_err();
            assert_eq!(err.http_status_code(), 400);
            assert!(err.to_string().contains("The PDF has 3 pages."));
        }
    }
}
