//! Wraps a JPEG in a single-page PDF.
//!
//! The JPEG body is embedded as-is in a DCTDecode image XObject, so no
//! recompression happens. The page is sized to the pixel dimensions in
//! points, i.e. the image lands at 72 dpi.

use image::ColorType;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

use shared::ConvertError;

fn pdf_err(e: lopdf::Error) -> ConvertError {
    ConvertError::Pdf(e.to_string())
}

/// Convert the JPEG at `input` into a one-page PDF at `output`.
/// Returns the page size in points.
pub fn jpeg_to_pdf(input: &Path, output: &Path) -> Result<(u32, u32), ConvertError> {
    let jpeg_bytes = std::fs::read(input)?;
    let img = image::load_from_memory_with_format(&jpeg_bytes, image::ImageFormat::Jpeg)?;
    let (width, height) = (img.width(), img.height());
    let grayscale = matches!(
        img.color(),
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16
    );

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // Raw JPEG data must not be deflated again
    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => if grayscale { "DeviceGray" } else { "DeviceRGB" },
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg_bytes,
    )
    .with_compression(false);
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width as i64).into(),
                    0.into(),
                    0.into(),
                    (height as i64).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id =
        doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (width as i64).into(),
            (height as i64).into(),
        ],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(output).map_err(|e| pdf_err(e.into()))?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb};

    fn sample_jpeg(path: &Path) {
        let img = image::RgbImage::from_pixel(10, 8, Rgb([180, 40, 40]));
        img.save_with_format(path, ImageFormat::Jpeg).unwrap();
    }

    fn find_image_object(doc: &Document) -> &Stream {
        doc.objects
            .values()
            .find_map(|obj| match obj {
                Object::Stream(stream)
                    if matches!(
                        stream.dict.get(b"Subtype").and_then(|o| o.as_name_str()),
                        Ok("Image")
                    ) =>
                {
                    Some(stream)
                }
                _ => None,
            })
            .expect("no image XObject in output")
    }

    #[test]
    fn test_page_matches_pixel_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("out.pdf");
        sample_jpeg(&input);

        assert_eq!(jpeg_to_pdf(&input, &output).unwrap(), (10, 8));

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 10);
        assert_eq!(media_box[3].as_i64().unwrap(), 8);
    }

    #[test]
    fn test_jpeg_bytes_are_embedded_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("out.pdf");
        sample_jpeg(&input);
        let original = std::fs::read(&input).unwrap();

        jpeg_to_pdf(&input, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        let stream = find_image_object(&doc);
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name_str().unwrap(),
            "DCTDecode"
        );
        assert_eq!(stream.content, original);
    }

    #[test]
    fn test_grayscale_jpeg_uses_device_gray() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.jpg");
        let output = dir.path().join("out.pdf");
        let img = image::GrayImage::from_pixel(6, 6, Luma([128]));
        img.save_with_format(&input, ImageFormat::Jpeg).unwrap();

        jpeg_to_pdf(&input, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        let stream = find_image_object(&doc);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name_str().unwrap(),
            "DeviceGray"
        );
    }

    #[test]
    fn test_non_jpeg_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fake.jpg");
        std::fs::write(&input, b"this is not a jpeg").unwrap();
        let err = jpeg_to_pdf(&input, &dir.path().join("out.pdf")).unwrap_err();
        assert_eq!(err.http_status_code(), 500);
    }
}
