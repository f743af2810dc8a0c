//! Client for an Ollama-style `/api/generate` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::models::AnalysisResult;

pub const ANALYSIS_INSTRUCTION: &str =
    "Analyze this blood test report and summarize abnormalities:";

/// Returned when the service answers without a `response` field.
pub const EMPTY_RESPONSE_FALLBACK: &str = "No response from AI";

#[async_trait]
pub trait ReportAnalysis: Send + Sync {
    async fn analyze(&self, report_text: &str) -> Result<AnalysisResult, AnalysisError>;
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

pub fn build_prompt(report_text: &str) -> String {
    format!("{}\n\n{}", ANALYSIS_INSTRUCTION, report_text)
}

/// Sends one non-streamed generation request per report.
#[derive(Clone)]
pub struct ReportAnalyzer {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl ReportAnalyzer {
    pub fn new(url: &str, model: &str) -> Self {
        Self {
            url: url.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReportAnalysis for ReportAnalyzer {
    async fn analyze(&self, report_text: &str) -> Result<AnalysisResult, AnalysisError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(report_text),
            stream: false,
        };

        info!(model = %self.model, prompt_chars = request.prompt.len(), "Requesting report analysis");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::MalformedBody(e.to_string()))?;

        let analysis = parsed
            .response
            .unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string());

        debug!(chars = analysis.len(), "Received analysis");
        Ok(AnalysisResult::new(analysis))
    }
}
