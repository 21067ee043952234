//! Stamps a centred page number near the bottom edge of every page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

use shared::ConvertError;

const FONT_SIZE: i64 = 10;
// Baseline sits 15pt above the bottom edge
const BOTTOM_MARGIN: i64 = 15;
// Resource name for the stamping font, unlikely to clash with existing keys
const FONT_KEY: &str = "FpNum";

fn pdf_err(e: lopdf::Error) -> ConvertError {
    ConvertError::Pdf(e.to_string())
}

/// Add page numbers to every page of `input`, writing the result to
/// `output`. Returns the number of pages stamped.
pub fn add_page_numbers(
    input: &Path,
    output: &Path,
    custom_text: Option<&str>,
) -> Result<u32, ConvertError> {
    let mut doc = Document::load(input).map_err(pdf_err)?;
    let pages = doc.get_pages();
    let total = pages.len() as u32;
    if total == 0 {
        return Err(ConvertError::Pdf("PDF has no pages".to_string()));
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    for (page_num, page_id) in pages {
        let label = page_label(page_num, custom_text);
        let (page_width, _) = page_size(&doc, page_id);
        let x = ((page_width - text_width(&label, FONT_SIZE as f64)) / 2.0).round() as i64;

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![FONT_KEY.into(), FONT_SIZE.into()]),
                Operation::new("Td", vec![x.into(), BOTTOM_MARGIN.into()]),
                Operation::new("Tj", vec![Object::string_literal(label)]),
                Operation::new("ET", vec![]),
            ],
        };
        let stream_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?));

        register_font(&mut doc, page_id, font_id)?;
        append_content(&mut doc, page_id, stream_id)?;
    }

    doc.save(output).map_err(|e| pdf_err(e.into()))?;
    Ok(total)
}

/// Page label: the bare number, or the custom format with `{n}` expanded.
fn page_label(page_num: u32, custom_text: Option<&str>) -> String {
    match custom_text {
        Some(text) if !text.trim().is_empty() => text.replace("{n}", &page_num.to_string()),
        _ => page_num.to_string(),
    }
}

/// Approximate Helvetica AFM advance widths, in milli-ems.
fn glyph_width_milli(c: char) -> u32 {
    match c {
        ' ' | '.' | ',' | '\'' | '!' | ':' | ';' => 278,
        'i' | 'j' | 'l' => 222,
        'f' | 't' | 'I' => 278,
        'r' | '(' | ')' | '[' | ']' | '-' | '/' => 333,
        'm' => 833,
        'w' => 722,
        'M' => 833,
        'W' => 944,
        'A'..='Z' => 667,
        _ => 556,
    }
}

fn text_width(text: &str, font_size: f64) -> f64 {
    let milli: u32 = text.chars().map(glyph_width_milli).sum();
    milli as f64 * font_size / 1000.0
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok().unwrap_or(obj),
        _ => obj,
    }
}

/// Look `key` up on the page dictionary, walking the Parent chain for
/// inheritable attributes (Resources, MediaBox).
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    // Page trees are shallow; the bound also guards against Parent cycles
    for _ in 0..32 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value).clone());
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Effective page size in points; US Letter when no MediaBox is reachable.
fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    if let Some(Object::Array(values)) = inherited(doc, page_id, b"MediaBox") {
        let nums: Vec<f64> = values
            .iter()
            .filter_map(|v| as_number(resolve(doc, v)))
            .collect();
        if nums.len() == 4 {
            return (nums[2] - nums[0], nums[3] - nums[1]);
        }
    }
    (612.0, 792.0)
}

/// Register the Helvetica stamp font on the page without discarding
/// inherited resources.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<(), ConvertError> {
    let mut resources = match inherited(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };
    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .unwrap_or_default(),
        _ => Dictionary::new(),
    };
    fonts.set(FONT_KEY, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(pdf_err)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Append the stamp stream after the existing page content.
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<(), ConvertError> {
    let page = doc
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(pdf_err)?;

    let new_contents = match page.get(b"Contents").ok().cloned() {
        Some(Object::Array(mut items)) => {
            items.push(Object::Reference(stream_id));
            Object::Array(items)
        }
        Some(existing) => Object::Array(vec![existing, Object::Reference(stream_id)]),
        None => Object::Reference(stream_id),
    };
    page.set("Contents", new_contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdf(path: &Path, page_count: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for _ in 0..page_count {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal("body")]),
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

        let kids_len = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => kids_len,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
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
    fn test_page_label_default_and_custom() {
        assert_eq!(page_label(3, None), "3");
        assert_eq!(page_label(3, Some("Page {n}")), "Page 3");
        assert_eq!(page_label(3, Some("  ")), "3");
    }

    #[test]
    fn test_text_width_digits() {
        // Every Helvetica digit advances 556/1000 em
        assert_eq!(text_width("123", 10.0), 3.0 * 5.56);
    }

    #[test]
    fn test_stamp_appends_content_and_font() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(&input, 3);

        let total = add_page_numbers(&input, &output, None).unwrap();
        assert_eq!(total, 3);

        let doc = Document::load(&output).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        for (_, page_id) in pages {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            // Original stream plus the stamp stream
            let contents = page.get(b"Contents").unwrap();
            assert_eq!(contents.as_array().unwrap().len(), 2);
            // Inherited resources were merged, not replaced
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
            assert!(fonts.has(FONT_KEY.as_bytes()));
            assert!(fonts.has(b"F1"));
        }
    }

    #[test]
    fn test_inherited_media_box_centres_on_a4() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        sample_pdf(&input, 1);

        let doc = Document::load(&input).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        assert_eq!(page_size(&doc, page_id), (595.0, 842.0));
    }

    #[test]
    fn test_unreadable_input_is_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("junk.pdf");
        std::fs::write(&input, b"not a pdf at all").unwrap();
        let err = add_page_numbers(&input, &dir.path().join("out.pdf"), None).unwrap_err();
        assert_eq!(err.http_status_code(), 500);
    }
}
