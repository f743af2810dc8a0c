use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use image::ImageFormat;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;

/// One rendered page, encoded as an image file (PNG from the default rasterizer).
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number.
    pub page: usize,
    pub data: Vec<u8>,
}

/// Renders every page of a PDF to an image, in page order.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf_data: &[u8]) -> Result<Vec<PageImage>, ExtractionError>;
}

/// Recognizes the text in a single page image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &PageImage) -> Result<String, ExtractionError>;
}

/// Rasterizes with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    pub fn is_available() -> bool {
        binary_answers("pdftoppm", "-v")
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_data: &[u8]) -> Result<Vec<PageImage>, ExtractionError> {
        let start = Instant::now();
        let work_dir = tempfile::tempdir()?;
        let pdf_path = work_dir.path().join("report.pdf");
        fs::write(&pdf_path, pdf_data)?;

        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&pdf_path)
            .arg(work_dir.path().join("page"))
            .output()
            .map_err(|e| ExtractionError::Rasterize(format!("failed to run pdftoppm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Rasterize(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // pdftoppm zero-pads page numbers, so a lexical sort is page order
        let mut image_paths: Vec<_> = fs::read_dir(work_dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        image_paths.sort();

        if image_paths.is_empty() {
            return Err(ExtractionError::Rasterize("pdftoppm produced no images".to_string()));
        }

        let pages = image_paths
            .iter()
            .enumerate()
            .map(|(index, path)| -> Result<PageImage, ExtractionError> {
                Ok(PageImage {
                    page: index + 1,
                    data: fs::read(path)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            pages = pages.len(),
            dpi = self.dpi,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rasterized PDF pages"
        );
        Ok(pages)
    }
}

/// Runs the `tesseract` CLI on each page image.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn is_available() -> bool {
        binary_answers("tesseract", "--version")
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &PageImage) -> Result<String, ExtractionError> {
        let format = image::guess_format(&image.data).map_err(|e| ExtractionError::Ocr {
            page: image.page,
            message: format!("page image is not a recognizable image: {}", e),
        })?;
        let extension = match format {
            ImageFormat::Png => ".png",
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Tiff => ".tif",
            ImageFormat::Bmp => ".bmp",
            ImageFormat::Pnm => ".ppm",
            other => {
                return Err(ExtractionError::Ocr {
                    page: image.page,
                    message: format!("unsupported image format {:?}", other),
                })
            }
        };

        let mut image_file = tempfile::Builder::new()
            .prefix("page-")
            .suffix(extension)
            .tempfile()?;
        image_file.write_all(&image.data)?;
        image_file.flush()?;

        let output = run_tesseract(image_file.path(), &self.language).map_err(|e| {
            ExtractionError::Ocr {
                page: image.page,
                message: format!("failed to run tesseract: {}", e),
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr {
                page: image.page,
                message: stderr.trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(page = image.page, chars = text.len(), "OCR page recognized");
        Ok(text)
    }
}

fn run_tesseract(path: &Path, language: &str) -> std::io::Result<std::process::Output> {
    Command::new("tesseract")
        .arg(path)
        .arg("stdout")
        .arg("-l")
        .arg(language)
        .output()
}

fn binary_answers(binary: &str, version_flag: &str) -> bool {
    match Command::new(binary).arg(version_flag).output() {
        Ok(_) => true,
        Err(e) => {
            warn!(binary = binary, error = %e, "External OCR tool not found");
            false
        }
    }
}
