use std::sync::Arc;
use std::time::Instant;

use lopdf::Document;

use crate::error::ExtractionError;
use crate::services::ocr_service::{OcrEngine, PageRasterizer};

/// Text pulled out of an uploaded report, plus how it was obtained.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub pages: usize,
    pub ocr_used: bool,
    pub processing_time_ms: u64,
}

/// Embedded-text extraction with an OCR fallback for image-only documents.
#[derive(Clone)]
pub struct TextExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { rasterizer, ocr }
    }

    /// Blocking. Run it off the async executor.
    pub fn extract(&self, pdf_data: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let start = Instant::now();

        tracing::info!("Starting PDF text extraction ({} bytes)", pdf_data.len());

        let document = Document::load_mem(pdf_data)
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        let pages = document.get_pages().len();
        if pages == 0 {
            return Err(ExtractionError::NoPages);
        }

        let layer = collect_text_layer(
            document
                .get_pages()
                .keys()
                .map(|&page_number| (page_number, document.extract_text(&[page_number]))),
        );
        let (text, ocr_used) = match layer {
            TextLayer::Complete(text) => (text, false),
            TextLayer::Missing => {
                tracing::warn!(pages = pages, "No embedded text layer found, falling back to OCR");
                (self.ocr_text(pdf_data)?, true)
            }
            TextLayer::Undecodable(failed_pages) => {
                // a partial text layer would hide part of the report, so read every page visually
                tracing::warn!(
                    pages = pages,
                    failed_pages = ?failed_pages,
                    "Embedded text could not be decoded on some pages, falling back to OCR"
                );
                (self.ocr_text(pdf_data)?, true)
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            pages = pages,
            chars = text.len(),
            ocr_used = ocr_used,
            processing_time_ms = processing_time_ms,
            "PDF text extraction completed"
        );

        Ok(ExtractedText {
            text,
            pages,
            ocr_used,
            processing_time_ms,
        })
    }

    fn ocr_text(&self, pdf_data: &[u8]) -> Result<String, ExtractionError> {
        let images = self.rasterizer.rasterize(pdf_data)?;
        let mut text = String::new();
        for image in &images {
            text.push_str(&self.ocr.recognize(image)?);
        }
        tracing::info!(pages = images.len(), chars = text.len(), "OCR extraction finished");
        Ok(text)
    }
}

/// Outcome of reading the embedded text of every page.
#[derive(Debug, PartialEq, Eq)]
enum TextLayer {
    /// Every page decoded and at least one carried text.
    Complete(String),
    /// Every page decoded but none carried text.
    Missing,
    /// These page numbers could not be decoded.
    Undecodable(Vec<u32>),
}

/// Concatenates the non-empty page texts in page order. A page whose text
/// cannot be decoded poisons the whole layer.
fn collect_text_layer<I, E>(pages: I) -> TextLayer
where
    I: IntoIterator<Item = (u32, Result<String, E>)>,
    E: std::fmt::Display,
{
    let mut text = String::new();
    let mut failed_pages = Vec::new();

    for (page_number, result) in pages {
        match result {
            Ok(page_text) if !page_text.trim().is_empty() => text.push_str(&page_text),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "Could not decode page text");
                failed_pages.push(page_number);
            }
        }
    }

    if !failed_pages.is_empty() {
        TextLayer::Undecodable(failed_pages)
    } else if text.trim().is_empty() {
        TextLayer::Missing
    } else {
        TextLayer::Complete(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> Result<String, String> {
        Ok(text.to_string())
    }

    #[test]
    fn test_text_layer_concatenates_in_page_order() {
        let layer = collect_text_layer(vec![(1, ok("Glucose\n")), (2, ok("  ")), (3, ok("Ferritin\n"))]);
        assert_eq!(layer, TextLayer::Complete("Glucose\nFerritin\n".to_string()));
    }

    #[test]
    fn test_text_layer_missing_when_all_pages_blank() {
        let layer = collect_text_layer(vec![(1, ok("")), (2, ok(" \n"))]);
        assert_eq!(layer, TextLayer::Missing);
    }

    #[test]
    fn test_undecodable_page_is_not_dropped() {
        let layer = collect_text_layer(vec![
            (1, ok("Hemoglobin: 10.2 g/dL\n")),
            (2, Err("unknown font encoding".to_string())),
            (3, ok("Platelets: 410\n")),
        ]);
        assert_eq!(layer, TextLayer::Undecodable(vec![2]));
    }
}
