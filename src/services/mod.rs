pub mod analyzer;
pub mod notifier;
pub mod ocr_service;
pub mod pdf_processor;
pub mod pipeline;

pub use analyzer::{ReportAnalysis, ReportAnalyzer};
pub use notifier::{ReportDelivery, SmtpNotifier};
pub use ocr_service::{OcrEngine, PageImage, PageRasterizer, PdftoppmRasterizer, TesseractOcr};
pub use pdf_processor::{ExtractedText, TextExtractor};
pub use pipeline::ReportPipeline;
