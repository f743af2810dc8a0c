use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

/// Failures while turning uploaded bytes into report text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid PDF document: {0}")]
    Parse(String),

    #[error("PDF document has no pages")]
    NoPages,

    #[error("page rasterization failed: {0}")]
    Rasterize(String),

    #[error("OCR failed on page {page}: {message}")]
    Ocr { page: usize, message: String },

    #[error("no text could be extracted from the document")]
    NoText,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the text-generation service.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("request to generation service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response from generation service: {0}")]
    MalformedBody(String),
}

/// Failures building or submitting the results email.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("invalid email address {address}: {message}")]
    Address { address: String, message: String },

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("SMTP transport failed: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("File too large: {size}MB exceeds limit of {limit}MB")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Upload exceeds the limit of {limit}MB")]
    UploadLimitExceeded { limit: usize },

    #[error("Error processing PDF: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to process report with the language model: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Error sending email: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::FileTooLarge { .. } | AppError::UploadLimitExceeded { .. } => "FILE_TOO_LARGE",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Analysis(_) => "ANALYSIS_ERROR",
            AppError::Delivery(_) => "DELIVERY_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } | AppError::UploadLimitExceeded { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Extraction(_)
            | AppError::Analysis(_)
            | AppError::Delivery(_)
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Attached to error responses so the request logger can report the code
/// alongside the request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            error_message = %message,
            "API error occurred"
        );

        let mut response = (status, Json(ErrorResponse::new(message))).into_response();
        response.extensions_mut().insert(ErrorCode(error_code));
        response
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("background task failed: {}", err),
        }
    }
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
