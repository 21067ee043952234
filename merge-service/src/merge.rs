//! Concatenates the pages of several PDFs into a fresh document.
//!
//! Objects of every source are renumbered into a shared ID space, inheritable
//! page attributes are materialized onto each page, and a new page tree and
//! catalog are built over the combined page list.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shared::ConvertError;

fn pdf_err(path: &Path, e: lopdf::Error) -> ConvertError {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ConvertError::Pdf(format!("Error with PDF file '{name}': {e}"))
}

/// Merge `inputs` (in order) into `output`. Returns the total page count.
pub fn merge_pdfs(inputs: &[PathBuf], output: &Path) -> Result<usize, ConvertError> {
    if inputs.is_empty() {
        return Err(ConvertError::InvalidInput("No files provided".to_string()));
    }

    let mut max_id = 1;
    let mut page_objects: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in inputs {
        let mut doc = Document::load(path).map_err(|e| pdf_err(path, e))?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, page_id) in doc.get_pages() {
            let mut dict = doc
                .get_object(page_id)
                .and_then(|o| o.as_dict())
                .map_err(|e| pdf_err(path, e))?
                .clone();
            // The source page tree is dropped below, so pull inheritable
            // attributes down onto the page itself first.
            for key in [b"Resources".as_ref(), b"MediaBox".as_ref(), b"Rotate".as_ref()] {
                if !dict.has(key) {
                    if let Some(value) = inherited(&doc, page_id, key) {
                        dict.set(key.to_vec(), value);
                    }
                }
            }
            page_objects.push((page_id, dict));
        }

        all_objects.extend(doc.objects.clone());
    }

    // Source catalogs, page trees, and outlines are replaced wholesale.
    all_objects.retain(|_, object| {
        !matches!(
            object.type_name().unwrap_or(""),
            "Catalog" | "Pages" | "Page" | "Outlines" | "Outline"
        )
    });

    let mut merged = Document::with_version("1.5");
    merged.objects = all_objects;
    merged.max_id = max_id;

    let pages_id = merged.new_object_id();
    let mut kids = Vec::with_capacity(page_objects.len());
    for (page_id, mut dict) in page_objects {
        dict.set("Parent", pages_id);
        kids.push(Object::Reference(page_id));
        merged.objects.insert(page_id, Object::Dictionary(dict));
    }
    let count = kids.len();

    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();
    merged
        .save(output)
        .map_err(|e| ConvertError::Internal(format!("Error merging PDFs: {e}")))?;

    Ok(count)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok().unwrap_or(obj),
        _ => obj,
    }
}

fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    for _ in 0..32 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value).clone());
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::Stream;

    fn sample_pdf(path: &Path, page_count: usize, marker: &str) {
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
                    Operation::new("Tj", vec![Object::string_literal(format!("{marker} {i}"))]),
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
    fn test_merge_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        let out = dir.path().join("merged.pdf");
        sample_pdf(&a, 2, "first");
        sample_pdf(&b, 3, "second");

        let total = merge_pdfs(&[a, b], &out).unwrap();
        assert_eq!(total, 5);

        let doc = Document::load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn test_merged_pages_carry_materialized_resources() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let out = dir.path().join("merged.pdf");
        sample_pdf(&a, 1, "only");

        merge_pdfs(&[a], &out).unwrap();

        let doc = Document::load(&out).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
    }

    #[test]
    fn test_empty_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_pdfs(&[], &dir.path().join("out.pdf")).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_corrupt_member_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("broken.pdf");
        std::fs::write(&bad, b"nope").unwrap();
        let err = merge_pdfs(&[bad], &dir.path().join("out.pdf")).unwrap_err();
        assert!(err.to_string().contains("broken.pdf"));
    }
}
