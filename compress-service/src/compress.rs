//! PDF rewriting with a quality-level-to-rewrite-steps mapping.
//!
//! Higher "quality" keeps more of the original structure; lower quality
//! applies progressively deeper rewrites (empty-stream removal, unused
//! object pruning, renumbering, full stream re-encoding).

use lopdf::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;

use shared::storage::file_size_kb;
use shared::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Maximum,
    High,
    Medium,
    Low,
    Minimum,
}

impl QualityLevel {
    /// Parse the form field; anything unrecognized falls back to Medium.
    pub fn from_form(value: &str) -> Self {
        match value {
            "Maximum" => QualityLevel::Maximum,
            "High" => QualityLevel::High,
            "Medium" => QualityLevel::Medium,
            "Low" => QualityLevel::Low,
            "Minimum" => QualityLevel::Minimum,
            _ => QualityLevel::Medium,
        }
    }

    fn steps(self) -> RewriteSteps {
        match self {
            QualityLevel::Maximum => RewriteSteps {
                deflate: true,
                strip_empty_streams: false,
                prune_unused: false,
                renumber: false,
                recode_streams: false,
            },
            QualityLevel::High => RewriteSteps {
                deflate: true,
                strip_empty_streams: true,
                prune_unused: false,
                renumber: false,
                recode_streams: false,
            },
            QualityLevel::Medium => RewriteSteps {
                deflate: true,
                strip_empty_streams: true,
                prune_unused: true,
                renumber: false,
                recode_streams: false,
            },
            QualityLevel::Low => RewriteSteps {
                deflate: true,
                strip_empty_streams: true,
                prune_unused: true,
                renumber: true,
                recode_streams: false,
            },
            QualityLevel::Minimum => RewriteSteps {
                deflate: true,
                strip_empty_streams: true,
                prune_unused: true,
                renumber: true,
                recode_streams: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RewriteSteps {
    deflate: bool,
    strip_empty_streams: bool,
    prune_unused: bool,
    renumber: bool,
    recode_streams: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionStats {
    pub original_size: f64,
    pub compressed_size: f64,
    pub reduction_percentage: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rewrite `input` into `output` and report the size change in KiB.
pub fn compress_pdf(
    input: &Path,
    output: &Path,
    level: QualityLevel,
) -> Result<CompressionStats, ConvertError> {
    let mut doc = Document::load(input).map_err(|e| ConvertError::Pdf(e.to_string()))?;
    let steps = level.steps();

    if steps.recode_streams {
        doc.decompress();
    }
    if steps.strip_empty_streams {
        doc.delete_zero_length_streams();
    }
    if steps.prune_unused {
        doc.prune_objects();
    }
    if steps.renumber {
        doc.renumber_objects();
    }
    if steps.deflate {
        doc.compress();
    }

    doc.save(output).map_err(|e| ConvertError::Pdf(e.to_string()))?;

    let original_size = file_size_kb(input)?;
    let compressed_size = file_size_kb(output)?;
    let reduction = if original_size > 0.0 {
        (1.0 - compressed_size / original_size) * 100.0
    } else {
        0.0
    };

    Ok(CompressionStats {
        original_size: round2(original_size),
        compressed_size: round2(compressed_size),
        reduction_percentage: round2(reduction),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn sample_pdf(path: &Path) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        // A deliberately repetitive stream so deflation has something to chew on
        let body = "The quick brown fox jumps over the lazy dog. ".repeat(200);
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(body)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        // An unreferenced object that pruning should drop
        doc.add_object(dictionary! { "Orphan" => "true" });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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
        doc.save(path).unwrap();
    }

    #[test]
    fn test_unknown_quality_falls_back_to_medium() {
        assert_eq!(QualityLevel::from_form("Medium"), QualityLevel::Medium);
        assert_eq!(QualityLevel::from_form("bogus"), QualityLevel::Medium);
        assert_eq!(QualityLevel::from_form(""), QualityLevel::Medium);
        assert_eq!(QualityLevel::from_form("Minimum"), QualityLevel::Minimum);
    }

    #[test]
    fn test_steps_escalate() {
        assert!(!QualityLevel::Maximum.steps().prune_unused);
        assert!(QualityLevel::Medium.steps().prune_unused);
        assert!(!QualityLevel::Medium.steps().renumber);
        assert!(QualityLevel::Minimum.steps().recode_streams);
    }

    #[test]
    fn test_compress_shrinks_repetitive_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(&input);

        let stats = compress_pdf(&input, &output, QualityLevel::Medium).unwrap();
        assert!(output.exists());
        assert!(stats.original_size > 0.0);
        assert!(stats.compressed_size > 0.0);
        assert!(stats.compressed_size < stats.original_size);
        assert!(stats.reduction_percentage > 0.0);

        // Result must still be a readable one-page PDF
        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_corrupt_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.pdf");
        std::fs::write(&input, b"garbage").unwrap();
        let err = compress_pdf(&input, &dir.path().join("out.pdf"), QualityLevel::Medium)
            .unwrap_err();
        assert_eq!(err.http_status_code(), 500);
    }
}
