use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisResult, EmailDispatch, UploadedReport};
use crate::services::analyzer::{ReportAnalysis, ReportAnalyzer};
use crate::services::notifier::{parse_mailbox, ReportDelivery, SmtpNotifier};
use crate::services::ocr_service::{PdftoppmRasterizer, TesseractOcr};
use crate::services::pdf_processor::TextExtractor;

/// Extract, analyze, then notify. Stops at the first failure.
#[derive(Clone)]
pub struct ReportPipeline {
    extractor: Arc<TextExtractor>,
    analyzer: Arc<dyn ReportAnalysis>,
    notifier: Arc<dyn ReportDelivery>,
}

impl ReportPipeline {
    pub fn new(
        extractor: Arc<TextExtractor>,
        analyzer: Arc<dyn ReportAnalysis>,
        notifier: Arc<dyn ReportDelivery>,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            notifier,
        }
    }

    /// Wires the production collaborators: pdftoppm, tesseract, Ollama and SMTP.
    pub fn from_config(config: &Config) -> Self {
        let extractor = TextExtractor::new(
            Arc::new(PdftoppmRasterizer::new(config.ocr_dpi)),
            Arc::new(TesseractOcr::new(config.ocr_language.clone())),
        );
        Self::new(
            Arc::new(extractor),
            Arc::new(ReportAnalyzer::new(&config.ollama_url, &config.model_name)),
            Arc::new(SmtpNotifier::new(
                &config.smtp_server,
                config.smtp_port,
                &config.sender_email,
                &config.sender_password,
            )),
        )
    }

    /// Extension check, extraction, analysis, then delivery. The first failure
    /// stops the run.
    ///
    /// The recipient address is parsed before extraction, so an unparseable
    /// address is rejected as invalid input (400) with no generation request
    /// made, rather than surfacing later as a delivery error.
    pub async fn run(&self, report: UploadedReport) -> AppResult<AnalysisResult> {
        if !report.has_pdf_extension() {
            return Err(AppError::invalid_input("Only PDF files are accepted"));
        }
        let recipient = parse_mailbox(&report.email)
            .map_err(|e| AppError::invalid_input(e.to_string()))?;

        let extractor = Arc::clone(&self.extractor);
        let content = report.content.clone();
        let extracted =
            tokio::task::spawn_blocking(move || extractor.extract(&content)).await??;

        info!(
            file_name = %report.file_name,
            pages = extracted.pages,
            ocr_used = extracted.ocr_used,
            "Report text extracted"
        );

        let result = self.analyzer.analyze(&extracted.text).await?;

        let dispatch = EmailDispatch::new(recipient, &result.analysis);
        self.notifier.deliver(&dispatch).await?;

        Ok(result)
    }
}
